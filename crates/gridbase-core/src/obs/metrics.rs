use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use time::OffsetDateTime;

///
/// EventState
/// Ephemeral, in-memory counters for one thread, since `window_start_ms`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub window_start_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            window_start_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Predicate compilation
    pub predicates_compiled: u64,
    pub predicates_unrestricted: u64,
    pub predicates_rejected: u64,
    pub filter_leaves: u64,

    // Recalculation
    pub recalc_rows: u64,
    pub recalc_columns: u64,
    pub evaluation_failures: u64,

    // Dependency validation
    pub cycles_rejected: u64,

    // Ordering
    pub order_keys_allocated: u64,
    pub ordering_underflows: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters and restart the window.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Counters are returned only when the requested window start does not
/// postdate the current window.
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    with_state(|m| {
        let include = window_start_ms.is_none_or(|requested| requested <= m.window_start_ms);

        EventReport {
            counters: include.then(|| m.clone()),
        }
    })
}

fn now_millis() -> u64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

    u64::try_from(millis).unwrap_or_default()
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `window_start_ms`.
    pub counters: Option<EventState>,
}

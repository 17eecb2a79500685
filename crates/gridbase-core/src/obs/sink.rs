//! Metrics sink boundary.
//!
//! Engines never touch `obs::metrics` directly. All instrumentation flows
//! through [`MetricsEvent`] and [`MetricsSink`]; this module is the only
//! bridge between engine logic and the thread-local counter state.
use crate::obs::metrics;
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    PredicateCompiled { leaves: u64, restricted: bool },
    PredicateRejected,
    ColumnsRecalculated { rows: u64, columns: u64 },
    EvaluationFailed,
    CycleRejected,
    OrderKeysAllocated { count: u64 },
    OrderingUnderflow,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink writing into the thread-local event state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| {
            let ops = &mut m.ops;
            match event {
                MetricsEvent::PredicateCompiled { leaves, restricted } => {
                    ops.predicates_compiled = ops.predicates_compiled.saturating_add(1);
                    ops.filter_leaves = ops.filter_leaves.saturating_add(leaves);
                    if !restricted {
                        ops.predicates_unrestricted = ops.predicates_unrestricted.saturating_add(1);
                    }
                }
                MetricsEvent::PredicateRejected => {
                    ops.predicates_rejected = ops.predicates_rejected.saturating_add(1);
                }
                MetricsEvent::ColumnsRecalculated { rows, columns } => {
                    ops.recalc_rows = ops.recalc_rows.saturating_add(rows);
                    ops.recalc_columns = ops.recalc_columns.saturating_add(columns);
                }
                MetricsEvent::EvaluationFailed => {
                    ops.evaluation_failures = ops.evaluation_failures.saturating_add(1);
                }
                MetricsEvent::CycleRejected => {
                    ops.cycles_rejected = ops.cycles_rejected.saturating_add(1);
                }
                MetricsEvent::OrderKeysAllocated { count } => {
                    ops.order_keys_allocated = ops.order_keys_allocated.saturating_add(count);
                }
                MetricsEvent::OrderingUnderflow => {
                    ops.ordering_underflows = ops.ordering_underflows.saturating_add(1);
                }
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` was produced from a live `&dyn MetricsSink` in `with_metrics_sink`,
        //   which restores the previous slot on every exit, unwinding included.
        // - `record` is synchronous and never keeps `ptr` past this call.
        // - Only a shared reference is materialized, matching the original borrow.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current thread's counters.
///
/// `window_start_ms` filters by window start (`EventState::window_start_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all counters on the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - The pointer is installed only for this dynamic scope; `Guard` restores
    //   the previous slot on all exits, including panic.
    // - `record` dereferences synchronously and never persists the pointer.
    // - Only shared access is ever exposed through the erased lifetime.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink<'a> {
        calls: &'a AtomicUsize,
    }

    impl MetricsSink for CountingSink<'_> {
        fn record(&self, _: MetricsEvent) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let outer_calls = AtomicUsize::new(0);
        let inner_calls = AtomicUsize::new(0);
        let outer = CountingSink {
            calls: &outer_calls,
        };
        let inner = CountingSink {
            calls: &inner_calls,
        };

        record(MetricsEvent::CycleRejected);
        assert_eq!(outer_calls.load(Ordering::SeqCst), 0);

        with_metrics_sink(&outer, || {
            record(MetricsEvent::PredicateRejected);
            assert_eq!(outer_calls.load(Ordering::SeqCst), 1);

            with_metrics_sink(&inner, || {
                record(MetricsEvent::OrderingUnderflow);
            });

            // restored to outer
            record(MetricsEvent::EvaluationFailed);
        });

        assert_eq!(outer_calls.load(Ordering::SeqCst), 2);
        assert_eq!(inner_calls.load(Ordering::SeqCst), 1);
        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let calls = AtomicUsize::new(0);
        let sink = CountingSink { calls: &calls };

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(&sink, || {
                record(MetricsEvent::CycleRejected);
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();
        assert!(panicked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });
    }

    #[test]
    fn global_sink_accumulates_counters() {
        metrics_reset_all();

        record(MetricsEvent::PredicateCompiled {
            leaves: 3,
            restricted: true,
        });
        record(MetricsEvent::PredicateCompiled {
            leaves: 0,
            restricted: false,
        });
        record(MetricsEvent::ColumnsRecalculated { rows: 2, columns: 5 });
        record(MetricsEvent::OrderKeysAllocated { count: 4 });
        record(MetricsEvent::OrderingUnderflow);

        let ops = metrics_report(None)
            .counters
            .expect("report without window start should include counters")
            .ops;
        assert_eq!(ops.predicates_compiled, 2);
        assert_eq!(ops.predicates_unrestricted, 1);
        assert_eq!(ops.filter_leaves, 3);
        assert_eq!(ops.recalc_rows, 2);
        assert_eq!(ops.recalc_columns, 5);
        assert_eq!(ops.order_keys_allocated, 4);
        assert_eq!(ops.ordering_underflows, 1);
    }

    #[test]
    fn metrics_report_window_start_after_window_returns_empty() {
        metrics_reset_all();
        let window_start = metrics::with_state(|m| m.window_start_ms);
        record(MetricsEvent::CycleRejected);

        assert!(
            metrics_report(Some(window_start.saturating_add(1)))
                .counters
                .is_none()
        );
        assert!(
            metrics_report(Some(window_start.saturating_sub(1)))
                .counters
                .is_some()
        );
    }
}

use time::{OffsetDateTime, UtcOffset};

///
/// ResolutionContext
///
/// Inputs a filter needs beyond the tree itself. Relative date literals
/// resolve against `now` in `utc_offset`, so identical contexts always
/// produce identical SQL.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolutionContext {
    pub now: OffsetDateTime,
    pub utc_offset: UtcOffset,
}

impl ResolutionContext {
    #[must_use]
    pub const fn new(now: OffsetDateTime, utc_offset: UtcOffset) -> Self {
        Self { now, utc_offset }
    }

    /// Context anchored at `now`, resolving calendar days in UTC.
    #[must_use]
    pub const fn utc(now: OffsetDateTime) -> Self {
        Self::new(now, UtcOffset::UTC)
    }

    /// Context anchored at the current wall-clock instant.
    #[must_use]
    pub fn current(utc_offset: UtcOffset) -> Self {
        Self::new(OffsetDateTime::now_utc(), utc_offset)
    }
}

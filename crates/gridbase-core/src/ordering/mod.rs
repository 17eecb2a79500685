//! Module: ordering
//! Responsibility: fractional order keys for per-view manual row ordering.
//! Does not own: the order columns themselves or the sequence backing appends.

mod allocator;
mod error;
mod sequence;

#[cfg(test)]
mod tests;

pub use allocator::{DEFAULT_PRECISION_FLOOR, OrderKeyAllocator};
pub use error::OrderingError;
pub use sequence::{MemorySequence, SequenceError, SequenceSource};

/// A row's position within one view; lower sorts first.
pub type OrderKey = f64;

///
/// MoveDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MoveDirection {
    /// Toward the top of the view (smaller keys).
    Up,

    /// Toward the bottom of the view (larger keys).
    #[default]
    Down,
}

/// Evenly spaced keys `1.0, 2.0, ..` for a full-column rewrite once
/// bisection has run out of precision.
#[must_use]
pub fn renormalize(count: usize) -> Vec<OrderKey> {
    let mut keys = Vec::with_capacity(count);
    let mut key = 0.0;
    for _ in 0..count {
        key += 1.0;
        keys.push(key);
    }

    keys
}

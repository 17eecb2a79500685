use crate::{
    obs::sink::{self, MetricsEvent},
    ordering::{MoveDirection, OrderKey, OrderingError, SequenceSource},
};

/// Smallest neighbour gap accepted before an allocation counts as
/// precision exhaustion.
pub const DEFAULT_PRECISION_FLOOR: f64 = 1e-9;

///
/// OrderKeyAllocator
///
/// Fractional order-key allocation for one view's order column. Appends draw
/// from the injected sequence; everything else bisects existing keys.
///

pub struct OrderKeyAllocator<'a, S: ?Sized> {
    sequence: &'a S,
    precision_floor: f64,
}

impl<'a, S> OrderKeyAllocator<'a, S>
where
    S: SequenceSource + ?Sized,
{
    #[must_use]
    pub const fn new(sequence: &'a S) -> Self {
        Self {
            sequence,
            precision_floor: DEFAULT_PRECISION_FLOOR,
        }
    }

    #[must_use]
    pub const fn with_precision_floor(mut self, precision_floor: f64) -> Self {
        self.precision_floor = precision_floor;
        self
    }

    /// Key for a row placed between two neighbours.
    ///
    /// - both neighbours: midpoint
    /// - only a left neighbour (append): fresh sequence value
    /// - only a right neighbour (prepend): half the right key, or one below
    ///   it when halving would not move downward
    /// - no neighbours (empty view): fresh sequence value
    pub fn insert_between(
        &self,
        left: Option<OrderKey>,
        right: Option<OrderKey>,
    ) -> Result<OrderKey, OrderingError> {
        let invalid = || OrderingError::InvalidBounds { left, right };
        if left.is_some_and(|key| !key.is_finite()) || right.is_some_and(|key| !key.is_finite()) {
            return Err(invalid());
        }

        let key = match (left, right) {
            (Some(left), Some(right)) => {
                if left >= right {
                    return Err(invalid());
                }
                let key = midpoint(left, right);
                self.check_precision(left, right, key);
                key
            }
            (Some(left), None) => self.next_after(left)?,
            (None, Some(right)) => {
                if right > 0.0 {
                    right / 2.0
                } else {
                    right - 1.0
                }
            }
            (None, None) => self.sequence.next_value()?,
        };

        sink::record(MetricsEvent::OrderKeysAllocated { count: 1 });

        Ok(key)
    }

    /// Fresh key at the end of the view.
    pub fn append_next(&self) -> Result<OrderKey, OrderingError> {
        let key = self.sequence.next_value()?;
        sink::record(MetricsEvent::OrderKeysAllocated { count: 1 });

        Ok(key)
    }

    /// Keys for a contiguous block of `count` rows moved between two bounds,
    /// in block order.
    pub fn reorder_block(
        &self,
        left: OrderKey,
        right: OrderKey,
        count: usize,
    ) -> Result<Vec<OrderKey>, OrderingError> {
        self.reorder_block_toward(left, right, count, MoveDirection::Down)
    }

    /// [`Self::reorder_block`] with an explicit move direction.
    ///
    /// Rows are assigned from the bound the block travels toward: moving
    /// down, the interval shrinks from the left; moving up, from the right.
    /// Each row takes the midpoint of what remains, so every key is strictly
    /// inside `(left, right)` and block order is preserved.
    pub fn reorder_block_toward(
        &self,
        left: OrderKey,
        right: OrderKey,
        count: usize,
        direction: MoveDirection,
    ) -> Result<Vec<OrderKey>, OrderingError> {
        if !left.is_finite() || !right.is_finite() || left >= right {
            return Err(OrderingError::InvalidBounds {
                left: Some(left),
                right: Some(right),
            });
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut keys = Vec::with_capacity(count);
        let (mut low, mut high) = (left, right);
        let mut exhausted = false;

        for _ in 0..count {
            let key = midpoint(low, high);
            exhausted |= self.is_exhausted(low, high, key);

            match direction {
                MoveDirection::Down => low = key,
                MoveDirection::Up => high = key,
            }
            keys.push(key);
        }

        if direction == MoveDirection::Up {
            keys.reverse();
        }
        if exhausted {
            report_underflow(left, right, count);
        }

        sink::record(MetricsEvent::OrderKeysAllocated {
            count: u64::try_from(count).unwrap_or(u64::MAX),
        });

        Ok(keys)
    }

    /// Fresh sequence value that must sort after `left`. Not counted as an
    /// allocation; callers use it as an open lower-edge bound.
    pub fn next_after(&self, left: OrderKey) -> Result<OrderKey, OrderingError> {
        let drawn = self.sequence.next_value()?;
        if drawn > left {
            return Ok(drawn);
        }

        tracing::warn!(drawn, left, "order key sequence is behind the view");

        Err(OrderingError::StaleSequence { drawn, left })
    }

    fn check_precision(&self, left: OrderKey, right: OrderKey, key: OrderKey) {
        if self.is_exhausted(left, right, key) {
            report_underflow(left, right, 1);
        }
    }

    fn is_exhausted(&self, low: OrderKey, high: OrderKey, key: OrderKey) -> bool {
        !(low < key && key < high) || high - low < self.precision_floor
    }
}

fn midpoint(left: OrderKey, right: OrderKey) -> OrderKey {
    left + (right - left) / 2.0
}

fn report_underflow(left: OrderKey, right: OrderKey, count: usize) {
    tracing::warn!(
        left,
        right,
        count,
        "order key precision exhausted; the view needs renormalizing"
    );
    sink::record(MetricsEvent::OrderingUnderflow);
}

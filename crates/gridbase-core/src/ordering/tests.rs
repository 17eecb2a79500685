use crate::{
    obs::{metrics_report, metrics_reset_all},
    ordering::{
        MemorySequence, MoveDirection, OrderKeyAllocator, OrderingError, SequenceError,
        renormalize,
    },
    test_support::FailingSequence,
};
use proptest::prelude::*;

fn is_strictly_increasing(keys: &[f64]) -> bool {
    keys.windows(2).all(|pair| pair[0] < pair[1])
}

#[test]
fn insert_between_two_neighbours_is_the_midpoint() {
    let sequence = MemorySequence::new(100.0);
    let allocator = OrderKeyAllocator::new(&sequence);

    assert_eq!(allocator.insert_between(Some(8.0), Some(10.0)), Ok(9.0));
    assert_eq!(allocator.insert_between(Some(-1.0), Some(0.0)), Ok(-0.5));
}

#[test]
fn insert_after_last_draws_from_the_sequence() {
    let sequence = MemorySequence::new(11.0);
    let allocator = OrderKeyAllocator::new(&sequence);

    assert_eq!(allocator.insert_between(Some(10.0), None), Ok(11.0));
    assert_eq!(allocator.insert_between(Some(10.0), None), Ok(12.0));
    assert_eq!(allocator.append_next(), Ok(13.0));
    assert_eq!(allocator.insert_between(None, None), Ok(14.0));
}

#[test]
fn insert_before_first_halves_or_steps_below() {
    let sequence = MemorySequence::new(1.0);
    let allocator = OrderKeyAllocator::new(&sequence);

    assert_eq!(allocator.insert_between(None, Some(4.0)), Ok(2.0));
    assert_eq!(allocator.insert_between(None, Some(0.0)), Ok(-1.0));
    assert_eq!(allocator.insert_between(None, Some(-3.0)), Ok(-4.0));
}

#[test]
fn invalid_bounds_are_rejected() {
    let sequence = MemorySequence::new(1.0);
    let allocator = OrderKeyAllocator::new(&sequence);

    assert!(matches!(
        allocator.insert_between(Some(5.0), Some(5.0)),
        Err(OrderingError::InvalidBounds { .. })
    ));
    assert!(matches!(
        allocator.insert_between(Some(f64::NAN), None),
        Err(OrderingError::InvalidBounds { .. })
    ));
    assert!(matches!(
        allocator.reorder_block(3.0, 1.0, 2),
        Err(OrderingError::InvalidBounds { .. })
    ));
}

#[test]
fn sequence_failures_surface() {
    let stale = MemorySequence::new(3.0);
    let allocator = OrderKeyAllocator::new(&stale);
    assert_eq!(
        allocator.insert_between(Some(10.0), None),
        Err(OrderingError::StaleSequence {
            drawn: 3.0,
            left: 10.0,
        })
    );

    let failing = FailingSequence::new(1.0, 1);
    let allocator = OrderKeyAllocator::new(&failing);
    assert_eq!(allocator.append_next(), Ok(1.0));
    assert_eq!(
        allocator.append_next(),
        Err(OrderingError::Sequence(SequenceError::new("sequence exhausted")))
    );
}

#[test]
fn repeated_inserts_between_evolving_neighbours_stay_ordered() {
    let sequence = MemorySequence::new(1.0);
    let allocator = OrderKeyAllocator::new(&sequence);

    let mut right = 10.0;
    let mut keys = Vec::new();
    for _ in 0..20 {
        let key = allocator
            .insert_between(Some(8.0), Some(right))
            .expect("bounds are valid");
        assert!(8.0 < key && key < right);
        keys.push(key);
        right = key;
    }

    keys.reverse();
    assert!(is_strictly_increasing(&keys));
}

#[test]
fn reorder_block_preserves_block_order_in_both_directions() {
    let sequence = MemorySequence::new(1.0);
    let allocator = OrderKeyAllocator::new(&sequence);

    let down = allocator.reorder_block(0.0, 8.0, 3).expect("valid bounds");
    assert_eq!(down, vec![4.0, 6.0, 7.0]);

    let up = allocator
        .reorder_block_toward(0.0, 8.0, 3, MoveDirection::Up)
        .expect("valid bounds");
    assert_eq!(up, vec![1.0, 2.0, 4.0]);

    assert!(allocator.reorder_block(0.0, 8.0, 0).expect("valid").is_empty());
}

#[test]
fn precision_exhaustion_warns_without_failing() {
    metrics_reset_all();
    let sequence = MemorySequence::new(1.0);
    let allocator = OrderKeyAllocator::new(&sequence);

    let left = 1.0;
    let right = left + f64::EPSILON;
    let key = allocator
        .insert_between(Some(left), Some(right))
        .expect("exhaustion is not an error");
    assert!(key >= left && key <= right);

    let ops = metrics_report(None)
        .counters
        .expect("counters should be reported")
        .ops;
    assert_eq!(ops.ordering_underflows, 1);
    assert_eq!(ops.order_keys_allocated, 1);
}

#[test]
fn renormalize_spaces_keys_evenly() {
    assert_eq!(renormalize(3), vec![1.0, 2.0, 3.0]);
    assert!(renormalize(0).is_empty());
}

proptest! {
    #[test]
    fn reorder_block_keys_stay_strictly_inside_bounds(
        left in -1.0e6f64..1.0e6,
        gap in 1.0f64..1.0e6,
        count in 1usize..24,
        up in any::<bool>(),
    ) {
        let sequence = MemorySequence::new(1.0);
        let allocator = OrderKeyAllocator::new(&sequence);
        let right = left + gap;
        let direction = if up { MoveDirection::Up } else { MoveDirection::Down };

        let keys = allocator
            .reorder_block_toward(left, right, count, direction)
            .expect("bounds are valid");

        prop_assert_eq!(keys.len(), count);
        prop_assert!(is_strictly_increasing(&keys));
        prop_assert!(keys.iter().all(|key| left < *key && *key < right));
    }

    #[test]
    fn midpoint_insert_is_strictly_between(left in -1.0e9f64..1.0e9, gap in 1.0e-3f64..1.0e9) {
        let sequence = MemorySequence::new(1.0);
        let allocator = OrderKeyAllocator::new(&sequence);
        let right = left + gap;

        let key = allocator.insert_between(Some(left), Some(right)).expect("bounds are valid");
        prop_assert!(left < key && key < right);
    }
}

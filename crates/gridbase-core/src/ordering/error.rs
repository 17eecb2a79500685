use crate::ordering::SequenceError;
use thiserror::Error as ThisError;

///
/// OrderingError
///
/// Precision exhaustion is deliberately absent: it is reported as a warning
/// and a metric, never as a failure.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum OrderingError {
    #[error("invalid order key bounds: left {left:?}, right {right:?}")]
    InvalidBounds {
        left: Option<f64>,
        right: Option<f64>,
    },

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error("sequence produced {drawn}, which is not above the last order key {left}")]
    StaleSequence { drawn: f64, left: f64 },
}

use std::sync::Mutex;
use thiserror::Error as ThisError;

///
/// SequenceError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("order key sequence failed: {message}")]
pub struct SequenceError {
    pub message: String,
}

impl SequenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

///
/// SequenceSource
///
/// Server-side monotonic counter used for appends. Every draw must be
/// strictly greater than all earlier draws, across transactions.
///

pub trait SequenceSource {
    fn next_value(&self) -> Result<f64, SequenceError>;
}

///
/// MemorySequence
///
/// Process-local sequence stepping by 1.0. Suitable for tests and for hosts
/// that serialize appends themselves.
///

#[derive(Debug)]
pub struct MemorySequence {
    next: Mutex<f64>,
}

impl MemorySequence {
    /// The first draw returns `start`.
    #[must_use]
    pub const fn new(start: f64) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }
}

impl SequenceSource for MemorySequence {
    fn next_value(&self) -> Result<f64, SequenceError> {
        let mut next = self
            .next
            .lock()
            .map_err(|_| SequenceError::new("memory sequence lock poisoned"))?;
        let value = *next;
        *next += 1.0;

        Ok(value)
    }
}

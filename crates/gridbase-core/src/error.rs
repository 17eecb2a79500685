use crate::{
    dependency::{CycleDetected, CycleRejected},
    ordering::OrderingError,
    predicate::CompileError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without a detail payload.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a recalc-origin internal error.
    pub(crate) fn recalc_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Recalc, message.into())
    }

    /// Returns `true` when the caller can fix the input and retry.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.class, ErrorClass::Validation)
    }
}

impl From<CompileError> for InternalError {
    fn from(err: CompileError) -> Self {
        Self {
            class: ErrorClass::Validation,
            origin: ErrorOrigin::Predicate,
            message: err.to_string(),
            detail: Some(ErrorDetail::Compile(err)),
        }
    }
}

impl From<CycleRejected> for InternalError {
    fn from(err: CycleRejected) -> Self {
        Self {
            class: ErrorClass::Validation,
            origin: ErrorOrigin::Dependency,
            message: err.to_string(),
            detail: Some(ErrorDetail::Cycle(err)),
        }
    }
}

impl From<CycleDetected> for InternalError {
    fn from(err: CycleDetected) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Dependency,
            err.to_string(),
        )
    }
}

impl From<OrderingError> for InternalError {
    fn from(err: OrderingError) -> Self {
        let class = match err {
            OrderingError::InvalidBounds { .. } => ErrorClass::Validation,
            OrderingError::StaleSequence { .. } => ErrorClass::InvariantViolation,
            OrderingError::Sequence(_) => ErrorClass::Internal,
        };

        Self {
            class,
            origin: ErrorOrigin::Ordering,
            message: err.to_string(),
            detail: Some(ErrorDetail::Ordering(err)),
        }
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Compile(CompileError),
    #[error("{0}")]
    Cycle(CycleRejected),
    #[error("{0}")]
    Ordering(OrderingError),
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Validation,
    Internal,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Predicate,
    Dependency,
    Recalc,
    Ordering,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Predicate => "predicate",
            Self::Dependency => "dependency",
            Self::Recalc => "recalc",
            Self::Ordering => "ordering",
        };
        write!(f, "{label}")
    }
}

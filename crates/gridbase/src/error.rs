use crate::config::ConfigError;
use derive_more::Display;
use gridbase_core::{
    dependency::{CycleDetected, CycleRejected},
    error::{ErrorDetail, ErrorOrigin as CoreErrorOrigin, InternalError},
    ordering::OrderingError,
    predicate::CompileError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Returns `true` for failures the caller should report as a bad request.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation(_))
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match (&err.detail, err.origin) {
            (Some(ErrorDetail::Compile(_)), _) => {
                ErrorKind::Validation(ValidationErrorKind::InvalidFilter)
            }
            (Some(ErrorDetail::Cycle(_)), _) => {
                ErrorKind::Validation(ValidationErrorKind::DependencyCycle)
            }
            (_, CoreErrorOrigin::Ordering) => ErrorKind::Ordering,
            _ => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<CycleRejected> for Error {
    fn from(err: CycleRejected) -> Self {
        InternalError::from(err).into()
    }
}

impl From<CycleDetected> for Error {
    fn from(err: CycleDetected) -> Self {
        InternalError::from(err).into()
    }
}

impl From<OrderingError> for Error {
    fn from(err: OrderingError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for the mutation pipeline.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Validation(ValidationErrorKind),

    /// Order keys could not be allocated.
    Ordering,

    /// Configuration failed to load or validate.
    Config,

    /// The caller cannot remediate this.
    Internal,
}

///
/// ValidationErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ValidationErrorKind {
    /// Filter tree does not compile against the table's fields.
    InvalidFilter,

    /// A field change would close a dependency loop.
    DependencyCycle,
}

///
/// ErrorOrigin
/// Public origin taxonomy.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Dependency,
    Ordering,
    Predicate,
    Recalc,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Dependency => Self::Dependency,
            CoreErrorOrigin::Ordering => Self::Ordering,
            CoreErrorOrigin::Predicate => Self::Predicate,
            CoreErrorOrigin::Recalc => Self::Recalc,
        }
    }
}

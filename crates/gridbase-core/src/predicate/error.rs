use crate::{filter::Operator, model::StorageCategory};
use thiserror::Error as ThisError;

///
/// CompileError
///
/// Filter-tree compilation failure. Always aborts the whole predicate and is
/// surfaced to the caller as a validation error naming the offending leaf.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error("filter references unknown field '{field_id}'")]
    UnknownField { field_id: String },

    #[error("filter on field '{field_id}' references unknown field '{referenced}'")]
    UnknownFieldRef {
        field_id: String,
        referenced: String,
    },

    #[error("operator '{operator}' is not supported on field '{field_id}' ({category})")]
    UnsupportedOperator {
        field_id: String,
        operator: Operator,
        category: StorageCategory,
    },

    #[error(
        "field '{field_id}' has no sub-key '{key}' (allowed: {})",
        .allowed.join(", ")
    )]
    UnknownSubKey {
        field_id: String,
        key: String,
        allowed: Vec<String>,
    },

    #[error("field '{field_id}' ({category}) does not have sub-keys")]
    SubKeyNotSupported {
        field_id: String,
        category: StorageCategory,
    },

    #[error("operator '{operator}' on field '{field_id}' expects {expected}")]
    InvalidLiteral {
        field_id: String,
        operator: Operator,
        expected: &'static str,
    },

    #[error("operator '{operator}' on field '{field_id}' cannot compare against another field")]
    FieldRefNotSupported { field_id: String, operator: Operator },

    #[error("filter nesting exceeds the maximum depth of {max}")]
    DepthExceeded { max: usize },
}

impl CompileError {
    /// Field id of the offending leaf, when the failure is leaf-local.
    #[must_use]
    pub fn field_id(&self) -> Option<&str> {
        match self {
            Self::UnknownField { field_id }
            | Self::UnknownFieldRef { field_id, .. }
            | Self::UnsupportedOperator { field_id, .. }
            | Self::UnknownSubKey { field_id, .. }
            | Self::SubKeyNotSupported { field_id, .. }
            | Self::InvalidLiteral { field_id, .. }
            | Self::FieldRefNotSupported { field_id, .. } => Some(field_id),
            Self::DepthExceeded { .. } => None,
        }
    }
}

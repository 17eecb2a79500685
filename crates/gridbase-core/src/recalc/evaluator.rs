use crate::recalc::RowState;
use serde_json::Value;
use thiserror::Error as ThisError;

///
/// EvaluationFailure
///
/// One column's expression could not be evaluated. Contained by the
/// recalculation engine; never aborts a row or a batch.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct EvaluationFailure {
    pub message: String,
}

impl EvaluationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

///
/// Evaluator
///
/// Injected formula evaluator. Implementations must be pure with respect to
/// `row`; the engine feeds each call the freshest merged state.
///

pub trait Evaluator {
    fn evaluate(&self, expression: &str, row: &RowState) -> Result<Value, EvaluationFailure>;
}

impl<F> Evaluator for F
where
    F: Fn(&str, &RowState) -> Result<Value, EvaluationFailure>,
{
    fn evaluate(&self, expression: &str, row: &RowState) -> Result<Value, EvaluationFailure> {
        self(expression, row)
    }
}

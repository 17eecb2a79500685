//! Shared fixtures for unit tests.

use crate::{
    model::{
        ComputedSpec, DateGranularity, Field, FieldMap, FieldOptions, FieldType, SystemColumn,
    },
    ordering::{MemorySequence, SequenceError, SequenceSource},
    predicate::ResolutionContext,
    recalc::{EvaluationFailure, RowState},
};
use serde_json::{Value, json};
use std::cell::Cell;
use time::OffsetDateTime;

/// 2024-06-15T12:30:00Z
pub(crate) const FIXED_NOW_UNIX: i64 = 1_718_454_600;

pub(crate) fn fixed_context() -> ResolutionContext {
    let now = OffsetDateTime::from_unix_timestamp(FIXED_NOW_UNIX).expect("fixed instant is valid");

    ResolutionContext::utc(now)
}

/// One field per storage shape the compiler dispatches on.
pub(crate) fn sample_fields() -> FieldMap {
    let minute = FieldOptions {
        granularity: DateGranularity::Minute,
        ..FieldOptions::default()
    };

    [
        Field::new("fldName", "name", FieldType::SingleLineText),
        Field::new("fldNick", "nickname", FieldType::SingleLineText),
        Field::new("fldStatus", "status", FieldType::SingleSelect),
        Field::new("fldAge", "age", FieldType::Number),
        Field::new("fldMin", "min_age", FieldType::Number),
        Field::new("fldDone", "done", FieldType::Checkbox),
        Field::new("fldDue", "due", FieldType::Date),
        Field::new("fldStart", "start", FieldType::Date),
        Field::new("fldSeen", "seen_at", FieldType::LastModifiedTime).with_options(minute),
        Field::new("fldAddr", "address", FieldType::Address),
        Field::new("fldTags", "tags", FieldType::MultipleSelect),
        Field::new("fldLabels", "labels", FieldType::Tags),
        Field::new("fldChoice", "choice", FieldType::Dropdown),
    ]
    .into_iter()
    .collect()
}

/// Computed chain `a = b + 1`, `b = c * 2` plus a failing and a broken
/// sibling reading `c` directly.
pub(crate) fn formula_fields() -> FieldMap {
    [
        Field::new("fldC", "c", FieldType::Number),
        Field::new("fldB", "b", FieldType::Formula).with_computed(ComputedSpec::new("c * 2", ["c"])),
        Field::new("fldA", "a", FieldType::Formula).with_computed(ComputedSpec::new("b + 1", ["b"])),
        Field::new("fldF2", "f2", FieldType::Formula)
            .with_computed(ComputedSpec::new("fail", ["c"])),
        Field::new("fldF3", "f3", FieldType::Formula)
            .with_computed(ComputedSpec::new("c - 1", ["c"])),
        Field::new("fldBroken", "broken", FieldType::Formula)
            .with_computed(ComputedSpec::new("c +", ["c"]).with_error()),
    ]
    .into_iter()
    .collect()
}

/// Evaluates `<column> <op> <number>` for `+ - *`; the expression `fail`
/// and any missing or non-numeric input fail.
pub(crate) fn arithmetic(expression: &str, row: &RowState) -> Result<Value, EvaluationFailure> {
    let parts: Vec<&str> = expression.split_whitespace().collect();
    let [column, op, operand] = parts.as_slice() else {
        return Err(EvaluationFailure::new(format!("cannot evaluate '{expression}'")));
    };

    let left = row
        .get(*column)
        .and_then(Value::as_f64)
        .ok_or_else(|| EvaluationFailure::new(format!("'{column}' is not a number")))?;
    let right: f64 = operand
        .parse()
        .map_err(|_| EvaluationFailure::new(format!("'{operand}' is not a number")))?;

    let result = match *op {
        "+" => left + right,
        "-" => left - right,
        "*" => left * right,
        other => return Err(EvaluationFailure::new(format!("unknown operator '{other}'"))),
    };

    Ok(json!(result))
}

pub(crate) fn row(values: Value) -> RowState {
    serde_json::from_value(values).expect("fixture row should be a JSON object")
}

pub(crate) fn row_with_id(id: &str, values: Value) -> RowState {
    let mut state = row(values);
    state.set(SystemColumn::Id.name(), id);
    state
}

///
/// FailingSequence
///
/// Sequence source that fails after `remaining` draws.
///

pub(crate) struct FailingSequence {
    inner: MemorySequence,
    remaining: Cell<usize>,
}

impl FailingSequence {
    pub(crate) fn new(start: f64, remaining: usize) -> Self {
        Self {
            inner: MemorySequence::new(start),
            remaining: Cell::new(remaining),
        }
    }
}

impl SequenceSource for FailingSequence {
    fn next_value(&self) -> Result<f64, SequenceError> {
        let remaining = self.remaining.get();
        if remaining == 0 {
            return Err(SequenceError::new("sequence exhausted"));
        }
        self.remaining.set(remaining - 1);

        self.inner.next_value()
    }
}

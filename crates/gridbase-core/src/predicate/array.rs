//! Array strategies. Scalar arrays (multi-select, tags) match members
//! directly; object arrays (dropdown entries) match on each element's
//! `label`.

use super::{CompileError, LeafScope, Operand};
use crate::{
    filter::Operator,
    sql::{BinaryOp, SqlExpr},
};
use serde_json::{Map, Value};

const LABEL_KEY: &str = "label";

///
/// ElementShape
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ElementShape {
    Scalar,
    Labelled,
}

impl ElementShape {
    fn element(self, label: &str) -> Value {
        match self {
            Self::Scalar => Value::String(label.to_string()),
            Self::Labelled => {
                let mut object = Map::new();
                object.insert(LABEL_KEY.to_string(), Value::String(label.to_string()));
                Value::Object(object)
            }
        }
    }

    // JSON array document holding one element per label.
    fn document(self, labels: &[String]) -> SqlExpr {
        let elements = labels.iter().map(|label| self.element(label)).collect();
        SqlExpr::json(Value::Array(elements).to_string())
    }

    fn has_any(self, column: &SqlExpr, labels: &[String]) -> SqlExpr {
        match self {
            Self::Scalar => SqlExpr::call(
                "jsonb_exists_any",
                vec![
                    column.clone(),
                    SqlExpr::Array(labels.iter().map(|label| SqlExpr::text(label.as_str())).collect()),
                ],
            ),
            Self::Labelled => {
                let mut checks: Vec<SqlExpr> = labels
                    .iter()
                    .map(|label| {
                        SqlExpr::contains(column.clone(), self.document(std::slice::from_ref(label)))
                    })
                    .collect();

                if checks.len() == 1 {
                    checks.remove(0)
                } else {
                    SqlExpr::or(checks)
                }
            }
        }
    }
}

pub(super) fn scalars(
    scope: &LeafScope<'_>,
    operand: &Operand<'_>,
) -> Result<Option<SqlExpr>, CompileError> {
    compile(scope, operand, ElementShape::Scalar)
}

pub(super) fn objects(
    scope: &LeafScope<'_>,
    operand: &Operand<'_>,
) -> Result<Option<SqlExpr>, CompileError> {
    compile(scope, operand, ElementShape::Labelled)
}

fn compile(
    scope: &LeafScope<'_>,
    operand: &Operand<'_>,
    shape: ElementShape,
) -> Result<Option<SqlExpr>, CompileError> {
    let column = scope.column_expr();
    let length = || SqlExpr::call("jsonb_array_length", vec![column.clone()]);

    match scope.operator {
        Operator::IsEmpty => {
            return Ok(Some(SqlExpr::or(vec![
                SqlExpr::is_null(column.clone()),
                SqlExpr::eq(length(), SqlExpr::number(0)),
            ])));
        }
        Operator::IsNotEmpty => {
            return Ok(Some(SqlExpr::and(vec![
                SqlExpr::is_not_null(column.clone()),
                SqlExpr::binary(BinaryOp::Gt, length(), SqlExpr::number(0)),
            ])));
        }
        _ => {}
    }

    let labels = match operand {
        Operand::Literal(value) => literal_labels(scope, value)?,
        Operand::Column(other) => {
            return column_comparison(scope, &column, SqlExpr::column(other.as_str()));
        }
        Operand::Absent => return Ok(None),
    };
    if labels.is_empty() {
        return Ok(None);
    }

    let expr = match scope.operator {
        Operator::Is | Operator::HasAllOf => {
            SqlExpr::contains(column.clone(), shape.document(&labels))
        }
        Operator::IsAnyOf | Operator::HasAnyOf => shape.has_any(&column, &labels),
        Operator::IsNot | Operator::IsNoneOf | Operator::HasNoneOf => SqlExpr::or(vec![
            SqlExpr::is_null(column.clone()),
            SqlExpr::not(shape.has_any(&column, &labels)),
        ]),
        Operator::IsExactly => {
            let count = u64::try_from(labels.len()).unwrap_or(u64::MAX);
            SqlExpr::and(vec![
                SqlExpr::contains(column.clone(), shape.document(&labels)),
                SqlExpr::eq(length(), SqlExpr::number(count)),
            ])
        }
        _ => return Err(scope.unsupported()),
    };

    Ok(Some(expr))
}

// Column-to-column set comparison; only containment shaped operators apply.
fn column_comparison(
    scope: &LeafScope<'_>,
    column: &SqlExpr,
    other: SqlExpr,
) -> Result<Option<SqlExpr>, CompileError> {
    match scope.operator {
        Operator::HasAllOf => Ok(Some(SqlExpr::contains(column.clone(), other))),
        Operator::IsExactly => Ok(Some(SqlExpr::and(vec![
            SqlExpr::contains(column.clone(), other.clone()),
            SqlExpr::contains(other, column.clone()),
        ]))),
        Operator::IsAnyOf
        | Operator::IsNoneOf
        | Operator::HasAnyOf
        | Operator::HasNoneOf
        | Operator::Is
        | Operator::IsNot => Err(scope.field_ref_unsupported()),
        _ => Err(scope.unsupported()),
    }
}

/// Labels named by a literal: one string or a list of strings. Duplicates
/// are dropped, first occurrence wins.
pub(super) fn literal_labels(
    scope: &LeafScope<'_>,
    value: &Value,
) -> Result<Vec<String>, CompileError> {
    let invalid = || scope.invalid_literal("a label or a list of labels");
    let mut labels: Vec<String> = Vec::new();

    let mut push = |item: &Value| -> Result<(), CompileError> {
        let label = match item {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            _ => return Err(invalid()),
        };
        if !labels.contains(&label) {
            labels.push(label);
        }

        Ok(())
    };

    match value {
        Value::Array(items) => {
            for item in items {
                push(item)?;
            }
        }
        other => push(other)?,
    }

    Ok(labels)
}

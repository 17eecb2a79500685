use super::{CompileError, LeafScope, Operand};
use crate::{
    filter::Operator,
    sql::{BinaryOp, SqlExpr, SqlLiteral, escape_like},
};
use serde_json::{Number, Value};

/// Text strategy. `target` is the column itself or a derived text
/// expression (object sub-key, concatenated object keys).
pub(super) fn text(
    scope: &LeafScope<'_>,
    target: SqlExpr,
    operand: &Operand<'_>,
) -> Result<Option<SqlExpr>, CompileError> {
    let expr = match scope.operator {
        Operator::IsEmpty => SqlExpr::or(vec![
            SqlExpr::is_null(target.clone()),
            SqlExpr::eq(target, SqlExpr::text("")),
        ]),
        Operator::IsNotEmpty => SqlExpr::and(vec![
            SqlExpr::is_not_null(target.clone()),
            SqlExpr::ne(target, SqlExpr::text("")),
        ]),
        Operator::Is => SqlExpr::eq(target, text_operand(scope, operand)?),
        Operator::IsNot => {
            let rhs = text_operand(scope, operand)?;
            SqlExpr::or(vec![
                SqlExpr::is_null(target.clone()),
                SqlExpr::ne(target, rhs),
            ])
        }
        Operator::Contains => SqlExpr::like(target, like_pattern(scope, operand)?, false),
        Operator::DoesNotContain => {
            let pattern = like_pattern(scope, operand)?;
            SqlExpr::or(vec![
                SqlExpr::is_null(target.clone()),
                SqlExpr::like(target, pattern, true),
            ])
        }
        Operator::IsAnyOf => {
            let list = text_list(scope, operand)?;
            if list.is_empty() {
                return Ok(None);
            }
            SqlExpr::in_list(target, list, false)
        }
        Operator::IsNoneOf => {
            let list = text_list(scope, operand)?;
            if list.is_empty() {
                return Ok(None);
            }
            SqlExpr::or(vec![
                SqlExpr::is_null(target.clone()),
                SqlExpr::in_list(target, list, true),
            ])
        }
        _ => return Err(scope.unsupported()),
    };

    Ok(Some(expr))
}

/// Number strategy: comparison operators map one to one.
pub(super) fn number(
    scope: &LeafScope<'_>,
    operand: &Operand<'_>,
) -> Result<Option<SqlExpr>, CompileError> {
    let column = scope.column_expr();
    let rhs = || number_operand(scope, operand);

    let expr = match scope.operator {
        Operator::IsEmpty => SqlExpr::is_null(column),
        Operator::IsNotEmpty => SqlExpr::is_not_null(column),
        Operator::Is => SqlExpr::eq(column, rhs()?),
        Operator::IsNot => SqlExpr::or(vec![
            SqlExpr::is_null(column.clone()),
            SqlExpr::ne(column, rhs()?),
        ]),
        Operator::IsGreater => SqlExpr::binary(BinaryOp::Gt, column, rhs()?),
        Operator::IsGreaterEqual => SqlExpr::binary(BinaryOp::Gte, column, rhs()?),
        Operator::IsLess => SqlExpr::binary(BinaryOp::Lt, column, rhs()?),
        Operator::IsLessEqual => SqlExpr::binary(BinaryOp::Lte, column, rhs()?),
        _ => return Err(scope.unsupported()),
    };

    Ok(Some(expr))
}

/// Checkbox strategy. An unchecked box may be stored as NULL, so `is false`
/// matches both.
pub(super) fn boolean(
    scope: &LeafScope<'_>,
    operand: &Operand<'_>,
) -> Result<Option<SqlExpr>, CompileError> {
    let column = scope.column_expr();

    let expr = match scope.operator {
        Operator::IsEmpty => SqlExpr::is_null(column),
        Operator::IsNotEmpty => SqlExpr::is_not_null(column),
        Operator::Is => match operand {
            Operand::Literal(Value::Bool(true)) => {
                SqlExpr::eq(column, SqlExpr::Literal(SqlLiteral::Bool(true)))
            }
            Operand::Literal(Value::Bool(false)) => SqlExpr::or(vec![
                SqlExpr::is_null(column.clone()),
                SqlExpr::eq(column, SqlExpr::Literal(SqlLiteral::Bool(false))),
            ]),
            Operand::Column(other) => SqlExpr::eq(column, SqlExpr::column(other.as_str())),
            Operand::Literal(_) | Operand::Absent => {
                return Err(scope.invalid_literal("a boolean"));
            }
        },
        _ => return Err(scope.unsupported()),
    };

    Ok(Some(expr))
}

fn text_operand(scope: &LeafScope<'_>, operand: &Operand<'_>) -> Result<SqlExpr, CompileError> {
    match operand {
        Operand::Literal(Value::String(text)) => Ok(SqlExpr::text(text.as_str())),
        Operand::Literal(Value::Number(number)) => Ok(SqlExpr::text(number.to_string())),
        Operand::Column(other) => Ok(SqlExpr::column(other.as_str())),
        Operand::Literal(_) | Operand::Absent => Err(scope.invalid_literal("a text value")),
    }
}

fn like_pattern(scope: &LeafScope<'_>, operand: &Operand<'_>) -> Result<SqlExpr, CompileError> {
    match operand {
        Operand::Literal(Value::String(text)) => {
            Ok(SqlExpr::text(format!("%{}%", escape_like(text))))
        }
        Operand::Literal(Value::Number(number)) => Ok(SqlExpr::text(format!("%{number}%"))),
        Operand::Column(other) => Ok(SqlExpr::Concat(vec![
            SqlExpr::text("%"),
            SqlExpr::column(other.as_str()),
            SqlExpr::text("%"),
        ])),
        Operand::Literal(_) | Operand::Absent => Err(scope.invalid_literal("a text value")),
    }
}

fn text_list(scope: &LeafScope<'_>, operand: &Operand<'_>) -> Result<Vec<SqlExpr>, CompileError> {
    match operand {
        Operand::Literal(value) => Ok(super::array::literal_labels(scope, value)?
            .into_iter()
            .map(SqlExpr::text)
            .collect()),
        Operand::Column(_) => Err(scope.field_ref_unsupported()),
        Operand::Absent => Ok(Vec::new()),
    }
}

fn number_operand(scope: &LeafScope<'_>, operand: &Operand<'_>) -> Result<SqlExpr, CompileError> {
    match operand {
        Operand::Literal(Value::Number(number)) => Ok(SqlExpr::number(number.clone())),
        Operand::Literal(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(SqlExpr::number)
            .ok_or_else(|| scope.invalid_literal("a number")),
        Operand::Column(other) => Ok(SqlExpr::column(other.as_str())),
        Operand::Literal(_) | Operand::Absent => Err(scope.invalid_literal("a number")),
    }
}

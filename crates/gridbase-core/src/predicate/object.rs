use super::{CompileError, LeafScope, Operand, scalar};
use crate::{filter::Operator, sql::SqlExpr};

/// Composite-object strategy. A named (already validated) sub-key is compared as text via
/// `->>`; without one the allowed keys are joined into a single string.
pub(super) fn compile(
    scope: &LeafScope<'_>,
    sub_key: Option<&str>,
    operand: &Operand<'_>,
) -> Result<Option<SqlExpr>, CompileError> {
    let keys = scope.category.object_keys();

    // `sub_key` was checked against `keys` by the caller.
    if let Some(key) = sub_key {
        return scalar::text(scope, SqlExpr::json_text(scope.column, key), operand);
    }

    let column = scope.column_expr();
    match scope.operator {
        Operator::IsEmpty => Ok(Some(SqlExpr::or(vec![
            SqlExpr::is_null(column.clone()),
            SqlExpr::eq(column, SqlExpr::json("{}")),
        ]))),
        Operator::IsNotEmpty => Ok(Some(SqlExpr::and(vec![
            SqlExpr::is_not_null(column.clone()),
            SqlExpr::ne(column, SqlExpr::json("{}")),
        ]))),
        _ => scalar::text(scope, joined_keys(scope.column, keys), operand),
    }
}

// COALESCE("col" ->> 'k1', '') || ' ' || COALESCE("col" ->> 'k2', '') ...
fn joined_keys(column: &str, keys: &[&str]) -> SqlExpr {
    let mut parts = Vec::with_capacity(keys.len() * 2);
    for (index, key) in keys.iter().enumerate() {
        if index > 0 {
            parts.push(SqlExpr::text(" "));
        }
        parts.push(SqlExpr::call(
            "COALESCE",
            vec![SqlExpr::json_text(column, *key), SqlExpr::text("")],
        ));
    }

    SqlExpr::Concat(parts)
}

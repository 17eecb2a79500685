//! Module: predicate
//! Responsibility: compile a filter tree plus field metadata into one SQL
//! boolean fragment, dispatching every leaf on its column's storage shape.
//! Does not own: filter decoding (`filter`) or quoting/escaping (`sql`).
//! Boundary: validation boundary between request filters and row selection.

mod array;
mod context;
mod date;
mod error;
mod object;
mod scalar;


pub use context::ResolutionContext;
pub use error::CompileError;

use crate::{
    MAX_FILTER_DEPTH,
    filter::{FilterLeaf, FilterNode, FilterValue, Operator},
    model::{DateGranularity, Field, FieldMap, ScalarKind, StorageCategory},
    obs::sink::{self, MetricsEvent},
    sql::{self, SqlExpr},
};
use serde_json::Value;
use std::fmt;

///
/// SqlFragment
///
/// Compiled predicate. An unrestricted fragment renders as the empty string
/// and matches every row.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SqlFragment {
    expr: Option<SqlExpr>,
}

impl SqlFragment {
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self { expr: None }
    }

    #[must_use]
    pub const fn expr(&self) -> Option<&SqlExpr> {
        self.expr.as_ref()
    }

    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        self.expr.is_none()
    }

    /// Render as SQL text; empty when unrestricted.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.expr.as_ref().map(sql::render).unwrap_or_default()
    }
}

impl fmt::Display for SqlFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Compile one filter tree.
pub fn compile(
    node: &FilterNode,
    fields: &FieldMap,
    ctx: &ResolutionContext,
) -> Result<SqlFragment, CompileError> {
    PredicateCompiler::new(fields, ctx).compile(node)
}

///
/// PredicateCompiler
///
/// Borrowing compiler over one field snapshot. Compilation is pure: the same
/// tree, fields and context always render the same SQL text.
///

#[derive(Clone, Copy, Debug)]
pub struct PredicateCompiler<'a> {
    fields: &'a FieldMap,
    ctx: &'a ResolutionContext,
}

impl<'a> PredicateCompiler<'a> {
    #[must_use]
    pub const fn new(fields: &'a FieldMap, ctx: &'a ResolutionContext) -> Self {
        Self { fields, ctx }
    }

    pub fn compile(&self, node: &FilterNode) -> Result<SqlFragment, CompileError> {
        let mut leaves = 0_u64;

        match self.compile_node(node, 1, &mut leaves) {
            Ok(expr) => {
                let restricted = expr.is_some();
                sink::record(MetricsEvent::PredicateCompiled { leaves, restricted });
                tracing::debug!(leaves, restricted, "compiled filter predicate");

                Ok(SqlFragment { expr })
            }
            Err(err) => {
                sink::record(MetricsEvent::PredicateRejected);
                tracing::debug!(error = %err, "filter predicate rejected");

                Err(err)
            }
        }
    }

    fn compile_node(
        &self,
        node: &FilterNode,
        depth: usize,
        leaves: &mut u64,
    ) -> Result<Option<SqlExpr>, CompileError> {
        if depth > MAX_FILTER_DEPTH {
            return Err(CompileError::DepthExceeded {
                max: MAX_FILTER_DEPTH,
            });
        }

        match node {
            FilterNode::Group {
                conjunction,
                children,
            } => {
                let mut compiled = Vec::with_capacity(children.len());
                for child in children {
                    if let Some(expr) = self.compile_node(child, depth + 1, leaves)? {
                        compiled.push(expr);
                    }
                }

                // Leaves without a value were dropped; an emptied group is the identity.
                if compiled.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SqlExpr::Junction {
                        conjunction: *conjunction,
                        children: compiled,
                    }))
                }
            }
            FilterNode::Leaf(leaf) => {
                *leaves = leaves.saturating_add(1);
                self.compile_leaf(leaf)
            }
        }
    }

    fn compile_leaf(&self, leaf: &FilterLeaf) -> Result<Option<SqlExpr>, CompileError> {
        let field = self
            .fields
            .get(&leaf.field_id)
            .ok_or_else(|| CompileError::UnknownField {
                field_id: leaf.field_id.clone(),
            })?;
        let scope = LeafScope::new(field, leaf.operator);

        // Shape checks run before the value is looked at, so a leaf that
        // would be dropped for lacking a value is still rejected when invalid.
        if let Some(key) = leaf.sub_key.as_deref() {
            let StorageCategory::JsonObject(allowed) = scope.category else {
                return Err(CompileError::SubKeyNotSupported {
                    field_id: leaf.field_id.clone(),
                    category: scope.category,
                });
            };
            if !allowed.contains(&key) {
                return Err(CompileError::UnknownSubKey {
                    field_id: leaf.field_id.clone(),
                    key: key.to_string(),
                    allowed: allowed.iter().map(|allowed| (*allowed).to_string()).collect(),
                });
            }
        }
        if !scope.category.supports(leaf.operator) {
            return Err(scope.unsupported());
        }

        let operand = self.resolve_operand(leaf)?;
        if matches!(operand, Operand::Absent) && !leaf.operator.is_empty_check() {
            return Ok(None);
        }

        match scope.category {
            StorageCategory::Scalar(ScalarKind::Text) => {
                scalar::text(&scope, scope.column_expr(), &operand)
            }
            StorageCategory::Scalar(ScalarKind::Number) => scalar::number(&scope, &operand),
            StorageCategory::Scalar(ScalarKind::Bool) => scalar::boolean(&scope, &operand),
            StorageCategory::Scalar(ScalarKind::Timestamp) => {
                date::compile(&scope, &operand, self.ctx)
            }
            StorageCategory::JsonObject(_) => {
                object::compile(&scope, leaf.sub_key.as_deref(), &operand)
            }
            StorageCategory::JsonArrayOfScalars => array::scalars(&scope, &operand),
            StorageCategory::JsonArrayOfObjects => array::objects(&scope, &operand),
        }
    }

    fn resolve_operand<'l>(&self, leaf: &'l FilterLeaf) -> Result<Operand<'l>, CompileError> {
        match &leaf.value {
            FilterValue::Null | FilterValue::Literal(Value::Null) => Ok(Operand::Absent),
            FilterValue::Literal(value) => Ok(Operand::Literal(value)),
            FilterValue::FieldRef(target) => self
                .fields
                .get(target)
                .map(|field| Operand::Column(field.db_column_name.clone()))
                .ok_or_else(|| CompileError::UnknownFieldRef {
                    field_id: leaf.field_id.clone(),
                    referenced: target.clone(),
                }),
        }
    }
}

///
/// Operand
///
/// Resolved right-hand side of a leaf.
///

#[derive(Clone, Debug)]
enum Operand<'a> {
    Absent,
    Literal(&'a Value),

    /// Physical column of a referenced field on the same row.
    Column(String),
}

///
/// LeafScope
///
/// Per-leaf facts shared by every storage strategy.
///

struct LeafScope<'a> {
    field_id: &'a str,
    column: &'a str,
    operator: Operator,
    category: StorageCategory,
    granularity: DateGranularity,
}

impl<'a> LeafScope<'a> {
    const fn new(field: &'a Field, operator: Operator) -> Self {
        Self {
            field_id: field.id.as_str(),
            column: field.db_column_name.as_str(),
            operator,
            category: field.storage_category(),
            granularity: field.options.granularity,
        }
    }

    fn column_expr(&self) -> SqlExpr {
        SqlExpr::column(self.column)
    }

    fn unsupported(&self) -> CompileError {
        CompileError::UnsupportedOperator {
            field_id: self.field_id.to_string(),
            operator: self.operator,
            category: self.category,
        }
    }

    fn invalid_literal(&self, expected: &'static str) -> CompileError {
        CompileError::InvalidLiteral {
            field_id: self.field_id.to_string(),
            operator: self.operator,
            expected,
        }
    }

    fn field_ref_unsupported(&self) -> CompileError {
        CompileError::FieldRefNotSupported {
            field_id: self.field_id.to_string(),
            operator: self.operator,
        }
    }
}

//! Orchestrator-facing surface of the mutation core.
//!
//! `MutationCore` borrows everything it needs for one mutation: a schema
//! snapshot, the formula evaluator, the order-key sequence and the loaded
//! configuration. The orchestrator calls it directly; nothing here persists
//! or publishes anything.

use crate::{config::CoreConfig, error::Error};
use gridbase_core::{
    dependency::{self, DependencyGraph, ProposedEdge},
    filter::{FilterFingerprint, FilterNode, fingerprint},
    model::{FieldMap, order_column_name},
    ordering::{MoveDirection, OrderKey, OrderKeyAllocator, OrderingError, SequenceSource},
    predicate::{self, ResolutionContext, SqlFragment},
    recalc::{ComputedValue, Evaluator, PendingRow, RecalculationEngine, RowState},
};
use std::collections::BTreeSet;

///
/// SchemaSource
///
/// Read-only view of one table's field registry.
///

pub trait SchemaSource {
    fn fields(&self) -> &FieldMap;

    fn dependency_graph(&self) -> &DependencyGraph;

    /// Global topological order of every computed column.
    fn execution_order(&self) -> &[String];
}

///
/// TableSnapshot
///
/// Owned [`SchemaSource`] for hosts that do not precompute the graph or
/// the global order.
///

#[derive(Clone, Debug)]
pub struct TableSnapshot {
    fields: FieldMap,
    graph: DependencyGraph,
    order: Vec<String>,
}

impl TableSnapshot {
    #[must_use]
    pub const fn new(fields: FieldMap, graph: DependencyGraph, order: Vec<String>) -> Self {
        Self {
            fields,
            graph,
            order,
        }
    }

    /// Derive the graph and its global order from computed fields.
    pub fn from_fields(fields: FieldMap) -> Result<Self, Error> {
        let graph = DependencyGraph::from_fields(&fields);
        let order = graph.topological_order()?;

        Ok(Self::new(fields, graph, order))
    }
}

impl SchemaSource for TableSnapshot {
    fn fields(&self) -> &FieldMap {
        &self.fields
    }

    fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    fn execution_order(&self) -> &[String] {
        &self.order
    }
}

///
/// MutationCore
///

pub struct MutationCore<'a> {
    schema: &'a dyn SchemaSource,
    evaluator: &'a (dyn Evaluator + Sync),
    sequence: &'a dyn SequenceSource,
    config: &'a CoreConfig,
}

impl<'a> MutationCore<'a> {
    #[must_use]
    pub const fn new(
        schema: &'a dyn SchemaSource,
        evaluator: &'a (dyn Evaluator + Sync),
        sequence: &'a dyn SequenceSource,
        config: &'a CoreConfig,
    ) -> Self {
        Self {
            schema,
            evaluator,
            sequence,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        self.config
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Context anchored at the current instant in the configured offset.
    pub fn resolution_context(&self) -> Result<ResolutionContext, Error> {
        let offset = self.config.filter.utc_offset()?;

        Ok(ResolutionContext::current(offset))
    }

    /// Compile a filter tree into a SQL fragment.
    pub fn compile_predicate(
        &self,
        filter: &FilterNode,
        ctx: &ResolutionContext,
    ) -> Result<SqlFragment, Error> {
        Ok(predicate::compile(filter, self.schema.fields(), ctx)?)
    }

    /// Compile with a context built from the configured offset.
    pub fn compile_predicate_now(&self, filter: &FilterNode) -> Result<SqlFragment, Error> {
        let ctx = self.resolution_context()?;

        self.compile_predicate(filter, &ctx)
    }

    /// Every field a filter touches, for visibility checks before compiling.
    /// Returns the ids that are not part of the table.
    #[must_use]
    pub fn unknown_filter_fields(&self, filter: &FilterNode) -> BTreeSet<String> {
        let fields = self.schema.fields();

        filter
            .referenced_field_ids()
            .into_iter()
            .filter(|id| fields.get(id).is_none())
            .collect()
    }

    #[must_use]
    pub fn filter_fingerprint(&self, filter: &FilterNode) -> FilterFingerprint {
        fingerprint(filter)
    }

    // ------------------------------------------------------------------
    // Dependencies
    // ------------------------------------------------------------------

    /// Computed columns reachable from `changed`, in execution order.
    #[must_use]
    pub fn affected_computed_columns<I, S>(&self, changed: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let affected = self.schema.dependency_graph().transitive_dependents(changed);

        self.execution_order(&affected)
    }

    #[must_use]
    pub fn execution_order(&self, subset: &BTreeSet<String>) -> Vec<String> {
        dependency::execution_order(self.schema.execution_order(), subset)
    }

    #[must_use]
    pub fn would_introduce_cycle(&self, edge: &ProposedEdge) -> bool {
        self.schema.dependency_graph().would_introduce_cycle(edge)
    }

    /// Validate the full upstream set proposed for `column`.
    pub fn validate_field_upstreams<I, S>(&self, column: &str, upstreams: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self
            .schema
            .dependency_graph()
            .validate_upstreams(column, upstreams)?)
    }

    // ------------------------------------------------------------------
    // Recalculation
    // ------------------------------------------------------------------

    #[must_use]
    pub fn recalculate(
        &self,
        execution_order: &[String],
        current: &RowState,
        pending: &RowState,
        row_id: Option<&str>,
    ) -> Vec<ComputedValue> {
        self.engine()
            .recalculate(execution_order, current, pending, row_id)
    }

    /// Recompute whatever the pending changes affect.
    #[must_use]
    pub fn recalculate_for_changes(
        &self,
        current: &RowState,
        pending: &RowState,
        row_id: Option<&str>,
    ) -> Vec<ComputedValue> {
        let order = self.affected_computed_columns(pending.keys());
        if order.is_empty() {
            return Vec::new();
        }

        self.recalculate(&order, current, pending, row_id)
    }

    /// Recompute independent rows on up to `recalc.workers` threads.
    pub fn recalculate_rows(
        &self,
        execution_order: &[String],
        rows: &[PendingRow],
    ) -> Result<Vec<Vec<ComputedValue>>, Error> {
        Ok(self.engine().recalculate_rows_parallel(
            execution_order,
            rows,
            self.config.recalc.workers,
        )?)
    }

    fn engine(&self) -> RecalculationEngine<'_, dyn Evaluator + Sync + 'a> {
        RecalculationEngine::new(self.schema.fields(), self.evaluator)
    }

    // ------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------

    /// Key for one row inserted between two neighbours.
    pub fn allocate_insert_key(
        &self,
        left: Option<OrderKey>,
        right: Option<OrderKey>,
    ) -> Result<OrderKey, Error> {
        Ok(self.allocator().insert_between(left, right)?)
    }

    /// Keys for a moved block. A missing left bound is the top of the view
    /// (`0.0`, or one below a non-positive right bound); a missing right
    /// bound is the bottom, taken from the sequence.
    pub fn allocate_reorder_keys(
        &self,
        left: Option<OrderKey>,
        right: Option<OrderKey>,
        count: usize,
        direction: MoveDirection,
    ) -> Result<Vec<OrderKey>, Error> {
        let allocator = self.allocator();

        if left.is_some_and(|key| !key.is_finite()) || right.is_some_and(|key| !key.is_finite()) {
            return Err(OrderingError::InvalidBounds { left, right }.into());
        }

        let (low, high) = match (left, right) {
            (Some(left), Some(right)) => (left, right),
            (Some(left), None) => (left, allocator.next_after(left)?),
            (None, Some(right)) => (top_below(right), right),
            (None, None) => {
                let high = self.sequence.next_value().map_err(OrderingError::from)?;
                (top_below(high), high)
            }
        };

        Ok(allocator.reorder_block_toward(low, high, count, direction)?)
    }

    /// Physical order column for a view.
    #[must_use]
    pub fn order_column(&self, view_id: &str) -> String {
        order_column_name(view_id)
    }

    fn allocator(&self) -> OrderKeyAllocator<'_, dyn SequenceSource + 'a> {
        OrderKeyAllocator::new(self.sequence)
            .with_precision_floor(self.config.ordering.precision_floor)
    }
}

// Open top bound under `key`.
fn top_below(key: OrderKey) -> OrderKey {
    if key > 0.0 { 0.0 } else { key - 1.0 }
}

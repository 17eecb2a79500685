//! Module: recalc
//! Responsibility: recompute a row's computed columns in execution order,
//! feeding each column the values produced earlier in the same pass.
//! Does not own: expression evaluation (injected) or persistence.
//! Boundary: per-column failures are contained here and never escape.

mod evaluator;
mod row;


pub use evaluator::{EvaluationFailure, Evaluator};
pub use row::RowState;

use crate::{
    error::InternalError,
    model::FieldMap,
    obs::sink::{self, MetricsEvent},
};
use rayon::{ThreadPoolBuilder, prelude::*};
use serde_json::Value;

///
/// ComputeStatus
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ComputeStatus {
    Evaluated,

    /// The field definition is flagged as broken; the evaluator was skipped.
    Errored,

    /// The evaluator failed; the message is kept for error-flagging.
    Failed(String),
}

///
/// ComputedValue
///
/// One recomputed column. Callers persist every entry in the same write as
/// the user-supplied changes; failed columns carry `Value::Null`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ComputedValue {
    pub column: String,
    pub value: Value,
    pub status: ComputeStatus,
}

impl ComputedValue {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.status, ComputeStatus::Failed(_))
    }
}

///
/// PendingRow
///
/// Input for bulk recalculation: one row's persisted values and the writes
/// about to be applied to it.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingRow {
    pub current: RowState,
    pub pending: RowState,
    pub row_id: Option<String>,
}

impl PendingRow {
    #[must_use]
    pub const fn new(current: RowState, pending: RowState) -> Self {
        Self {
            current,
            pending,
            row_id: None,
        }
    }

    #[must_use]
    pub fn with_row_id(mut self, row_id: impl Into<String>) -> Self {
        self.row_id = Some(row_id.into());
        self
    }
}

///
/// RecalculationEngine
///

pub struct RecalculationEngine<'a, E: ?Sized> {
    fields: &'a FieldMap,
    evaluator: &'a E,
}

impl<'a, E> RecalculationEngine<'a, E>
where
    E: Evaluator + ?Sized,
{
    #[must_use]
    pub const fn new(fields: &'a FieldMap, evaluator: &'a E) -> Self {
        Self { fields, evaluator }
    }

    /// Recompute `execution_order` over `current ∪ pending`.
    pub fn recalculate(
        &self,
        execution_order: &[String],
        current: &RowState,
        pending: &RowState,
        row_id: Option<&str>,
    ) -> Vec<ComputedValue> {
        let values = self.recalculate_row(execution_order, current, pending, row_id);
        record_outcome(1, std::slice::from_ref(&values));

        values
    }

    /// Recompute independent rows one after another.
    pub fn recalculate_rows(
        &self,
        execution_order: &[String],
        rows: &[PendingRow],
    ) -> Vec<Vec<ComputedValue>> {
        let results: Vec<_> = rows
            .iter()
            .map(|row| self.recalculate_pending(execution_order, row))
            .collect();
        record_outcome(rows.len(), &results);

        results
    }

    /// Recompute independent rows on a pool of at most `workers` threads.
    /// Output order matches input order.
    pub fn recalculate_rows_parallel(
        &self,
        execution_order: &[String],
        rows: &[PendingRow],
        workers: usize,
    ) -> Result<Vec<Vec<ComputedValue>>, InternalError>
    where
        E: Sync,
    {
        if workers <= 1 || rows.len() <= 1 {
            return Ok(self.recalculate_rows(execution_order, rows));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|err| {
                InternalError::recalc_internal(format!("recalculation pool unavailable: {err}"))
            })?;

        let results: Vec<_> = pool.install(|| {
            rows.par_iter()
                .map(|row| self.recalculate_pending(execution_order, row))
                .collect()
        });

        // counters are thread-local; account on the calling thread
        record_outcome(rows.len(), &results);

        Ok(results)
    }

    fn recalculate_pending(&self, execution_order: &[String], row: &PendingRow) -> Vec<ComputedValue> {
        self.recalculate_row(
            execution_order,
            &row.current,
            &row.pending,
            row.row_id.as_deref(),
        )
    }

    fn recalculate_row(
        &self,
        execution_order: &[String],
        current: &RowState,
        pending: &RowState,
        row_id: Option<&str>,
    ) -> Vec<ComputedValue> {
        let mut merged = RowState::merged(current, pending);
        let row_id = row_id.or_else(|| merged.record_id()).map(str::to_string);
        let mut values = Vec::with_capacity(execution_order.len());

        for column in execution_order {
            let Some(spec) = self.fields.computed_by_column(column) else {
                tracing::warn!(column = %column, "execution order names a column that is not computed");
                continue;
            };

            let (value, status) = if spec.has_error {
                (Value::Null, ComputeStatus::Errored)
            } else {
                match self.evaluator.evaluate(&spec.expression, &merged) {
                    Ok(value) => (value, ComputeStatus::Evaluated),
                    Err(err) => {
                        tracing::warn!(
                            column = %column,
                            row_id = ?row_id,
                            error = %err,
                            "computed column evaluation failed"
                        );
                        (Value::Null, ComputeStatus::Failed(err.message))
                    }
                }
            };

            merged.set(column.clone(), value.clone());
            values.push(ComputedValue {
                column: column.clone(),
                value,
                status,
            });
        }

        values
    }
}

fn record_outcome(rows: usize, results: &[Vec<ComputedValue>]) {
    let columns = results.iter().map(Vec::len).sum::<usize>();
    let failures = results
        .iter()
        .flatten()
        .filter(|value| value.is_failed())
        .count();

    sink::record(MetricsEvent::ColumnsRecalculated {
        rows: u64::try_from(rows).unwrap_or(u64::MAX),
        columns: u64::try_from(columns).unwrap_or(u64::MAX),
    });
    for _ in 0..failures {
        sink::record(MetricsEvent::EvaluationFailed);
    }
    tracing::debug!(rows, columns, failures, "recalculated computed columns");
}

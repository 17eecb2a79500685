//! Module: dependency
//! Responsibility: read-only reasoning over the computed-column dependency
//! graph: affected-column discovery, execution ordering, cycle checks.
//! Does not own: the graph itself (supplied per call by the field registry).

mod error;
mod graph;

#[cfg(test)]
mod tests;

pub use error::{CycleDetected, CycleRejected};
pub use graph::{DependencyGraph, ProposedEdge};

use std::collections::BTreeSet;

/// Filter a precomputed global order down to `subset`, keeping relative
/// order. Members missing from the global order are appended in
/// lexicographic order so no requested column is silently dropped.
#[must_use]
pub fn execution_order(global_order: &[String], subset: &BTreeSet<String>) -> Vec<String> {
    let mut order: Vec<String> = global_order
        .iter()
        .filter(|column| subset.contains(column.as_str()))
        .cloned()
        .collect();

    if order.len() < subset.len() {
        let placed: BTreeSet<&str> = order.iter().map(String::as_str).collect();
        let missing: Vec<String> = subset
            .iter()
            .filter(|column| !placed.contains(column.as_str()))
            .cloned()
            .collect();

        tracing::warn!(
            missing = ?missing,
            "computed columns absent from the global execution order"
        );
        order.extend(missing);
    }

    order
}

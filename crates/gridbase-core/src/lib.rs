//! Core runtime for Gridbase: field model, filter compilation, formula
//! dependency resolution and recalculation, fractional row ordering, and
//! the observability sink used by all of them.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod dependency;
pub mod error;
pub mod filter;
pub mod model;
pub mod obs;
pub mod ordering;
pub mod predicate;
pub mod recalc;
pub mod sql;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Maximum nesting depth accepted for a filter tree.
///
/// Filter trees arrive from request payloads; the compiler recurses once per
/// level, so the depth is bounded before any SQL is produced.
pub const MAX_FILTER_DEPTH: usize = 32;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, engines, or sinks are re-exported here.
///

pub mod prelude {
    pub use crate::{
        dependency::{DependencyGraph, ProposedEdge},
        filter::{Conjunction, FilterLeaf, FilterNode, FilterValue, Operator},
        model::{ComputedSpec, Field, FieldMap, FieldOptions, FieldType, StorageCategory},
        ordering::OrderKey,
        recalc::{ComputedValue, RowState},
    };
}

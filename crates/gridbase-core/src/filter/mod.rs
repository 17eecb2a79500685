//! Filter tree vocabulary.
//!
//! Pure, schema-agnostic representation of a row-selection predicate as it
//! arrives from a request. Field resolution, operator legality and SQL
//! generation all happen in `predicate`.

mod fingerprint;
mod node;

pub use fingerprint::{FilterFingerprint, fingerprint};
pub use node::{Conjunction, FilterLeaf, FilterNode, FilterValue, Operator};

#[cfg(test)]
mod tests;

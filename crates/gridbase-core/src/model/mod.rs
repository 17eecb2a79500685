//! Field metadata consumed by every engine in this crate.
//!
//! The field registry that owns these definitions lives outside the core;
//! a per-call [`FieldMap`] snapshot is borrowed, never mutated.

mod column;
mod field;
mod storage;

pub use column::{ORDER_COLUMN_PREFIX, SystemColumn, order_column_name};
pub use field::{
    CellValueType, ComputedSpec, DateGranularity, Field, FieldMap, FieldOptions, FieldType,
    FormulaResult,
};
pub use storage::{ADDRESS_KEYS, PHONE_KEYS, ScalarKind, StorageCategory};

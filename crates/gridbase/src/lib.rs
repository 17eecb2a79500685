//! # gridbase
//!
//! Public facade over the Gridbase record-mutation core.
//!
//! ## Crate layout
//! - `core`:
//!   field model, filter trees, SQL fragments, predicate compiler,
//!   dependency resolver, recalculation engine and order-key allocator.
//!
//! - `config`:
//!   TOML configuration for worker counts, ordering precision and the
//!   default time-zone offset for date filters.
//!
//! - `error`:
//!   the public error type with a stable kind + origin taxonomy.
//!
//! - `session`:
//!   [`MutationCore`](session::MutationCore), the surface the record
//!   orchestrator calls while applying one mutation.
//!
//! ## Preludes
//! - `prelude`:
//!   domain vocabulary plus the facade types needed to drive a mutation.

// export so things just work in base/
pub use gridbase_core as core;

pub mod config;
pub mod error;
pub mod session;

pub use error::Error;

///
/// CONSTANTS
///

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::CoreConfig,
        error::Error,
        session::{MutationCore, SchemaSource, TableSnapshot},
    };
    pub use gridbase_core::prelude::*;
}

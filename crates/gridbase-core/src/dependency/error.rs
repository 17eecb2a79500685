use thiserror::Error as ThisError;

///
/// CycleRejected
///
/// A proposed dependency edge would close a loop. `path` walks the loop
/// starting and ending at `from`.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error(
    "column '{from}' cannot depend on '{to}': it would close the cycle {}",
    .path.join(" -> ")
)]
pub struct CycleRejected {
    pub from: String,
    pub to: String,
    pub path: Vec<String>,
}

///
/// CycleDetected
///
/// The supplied graph already contains a loop, so no execution order
/// exists. `columns` lists every computed column left unordered.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("dependency graph contains a cycle through: {}", .columns.join(", "))]
pub struct CycleDetected {
    pub columns: Vec<String>,
}

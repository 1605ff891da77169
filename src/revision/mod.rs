// ============================================================================
// Revisions
// ============================================================================
//
// A revision is one versioned schema change with explicit forward and
// reverse operations. The graph orders them through parent pointers and
// answers "which revisions, in which order, to get from A to B".
//
// ============================================================================

pub mod graph;
pub mod revision;
pub mod target;

pub use graph::{MigrationPath, RevisionGraph};
pub use revision::{CustomOperationFn, Direction, Operation, Revision};
pub use target::TargetSpec;

use thiserror::Error;

use crate::revision::Direction;

#[derive(Error, Debug)]
pub enum MigrateError {
    // ------------------------------------------------------------------
    // Revision graph
    // ------------------------------------------------------------------
    #[error("Unknown revision '{0}'")]
    UnknownRevision(String),

    #[error("Revision '{0}' is defined more than once")]
    DuplicateRevision(String),

    #[error("Revision graph is disjoint: roots {}", .roots.join(", "))]
    DisjointGraph { roots: Vec<String> },

    #[error("Revision '{parent}' has multiple children: {}", .children.join(", "))]
    BranchedGraph { parent: String, children: Vec<String> },

    #[error("Revision graph has no root; cycle through '{0}'")]
    CycleDetected(String),

    #[error("Revision prefix '{prefix}' is ambiguous: {}", .candidates.join(", "))]
    AmbiguousRevision { prefix: String, candidates: Vec<String> },

    #[error("Cannot {direction} from {from} to {to}")]
    InvalidDirection {
        direction: Direction,
        from: String,
        to: String,
    },

    #[error("Operation '{0}' has no derivable inverse")]
    IrreversibleOperation(String),

    // ------------------------------------------------------------------
    // Migration run
    // ------------------------------------------------------------------
    #[error("Revision '{revision}' failed during {direction}: {source}")]
    OperationFailure {
        revision: String,
        direction: Direction,
        #[source]
        source: Box<MigrateError>,
    },

    #[error("Another migration is already running against target '{0}'")]
    ConcurrentMigrationDetected(String),

    // ------------------------------------------------------------------
    // Schema (DDL) errors raised by the target database
    // ------------------------------------------------------------------
    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Index '{0}' already exists")]
    IndexExists(String),

    #[error("Index '{0}' not found")]
    IndexNotFound(String),

    #[error("Column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    // ------------------------------------------------------------------
    // Infrastructure
    // ------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MigrateError>;

impl MigrateError {
    /// Revision id attached to a failed step, if any.
    pub fn failed_revision(&self) -> Option<&str> {
        match self {
            Self::OperationFailure { revision, .. } => Some(revision),
            _ => None,
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for MigrateError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

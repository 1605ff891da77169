// ============================================================================
// sheets-migrate Library
// ============================================================================

pub mod config;
pub mod core;
pub mod logging;
pub mod migrator;
pub mod revision;
pub mod revisions;
pub mod schema;
pub mod storage;

// Re-export main types for convenience
pub use config::{DatabaseUri, LogFormat, LogLevel, MigrateConfig};
pub use core::{Column, DataType, IndexDef, MigrateError, Result, TableDef, Value};
pub use migrator::{MigrationReport, Migrator, SchemaTransaction};
pub use revision::{Direction, Revision, RevisionGraph, TargetSpec};
pub use schema::SchemaOp;
pub use storage::{FileBackend, MemoryBackend, SchemaBackend};

/// Migrator over the built-in revisions for a configured database.
///
/// # Examples
///
/// ```
/// use sheets_migrate::{MigrateConfig, open};
///
/// # fn main() -> sheets_migrate::Result<()> {
/// let config = MigrateConfig::new().database_url("memory://")?;
/// let migrator = open(&config)?;
///
/// let report = migrator.upgrade_to_latest()?;
/// assert_eq!(migrator.current()?.as_deref(), Some("d4d2b2fce5f8"));
/// assert_eq!(report.steps.len(), 2);
/// # Ok(())
/// # }
/// ```
pub fn open(config: &MigrateConfig) -> Result<Migrator<Box<dyn SchemaBackend>>> {
    let graph = revisions::graph()?;
    Ok(Migrator::new(graph, config.database.open())
        .target_name(config.target.clone())
        .echo(config.echo))
}

pub mod migrator;
pub mod report;
pub mod transaction;

pub use migrator::{DEFAULT_TARGET, Migrator};
pub use report::{AppliedStep, HistoryEntry, MigrationReport, PlannedStep};
pub use transaction::SchemaTransaction;

use std::sync::{Arc, Mutex};

use super::{DatabaseState, MigrationLock, SchemaBackend};
use crate::core::Result;

/// Process-local target database. Clones share the same state, so a test can
/// keep a handle while the migrator owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<DatabaseState>>,
    lock_slot: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing state, e.g. one loaded for a dry run.
    pub fn with_state(state: DatabaseState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            lock_slot: Arc::default(),
        }
    }
}

impl SchemaBackend for MemoryBackend {
    fn describe(&self) -> String {
        "memory://".to_string()
    }

    fn load(&self) -> Result<DatabaseState> {
        Ok(self.state.lock()?.clone())
    }

    fn commit(&self, state: DatabaseState) -> Result<()> {
        *self.state.lock()? = state;
        Ok(())
    }

    fn lock(&self, target: &str) -> Result<MigrationLock> {
        MigrationLock::acquire_slot(&self.lock_slot, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType, MigrateError, TableDef};

    #[test]
    fn test_clones_share_state() {
        let backend = MemoryBackend::new();
        let handle = backend.clone();

        let mut state = backend.load().unwrap();
        state.catalog = state
            .catalog
            .with_table(TableDef::new("spell").column(Column::new("id", DataType::Integer)))
            .unwrap();
        state.versions.set("default", Some("d4d2b2fce5f8"));
        backend.commit(state).unwrap();

        let seen = handle.load().unwrap();
        assert!(seen.catalog.table_exists("spell"));
        assert_eq!(seen.versions.current("default"), Some("d4d2b2fce5f8"));
    }

    #[test]
    fn test_uncommitted_changes_are_invisible() {
        let backend = MemoryBackend::new();
        let mut working = backend.load().unwrap();
        working.versions.set("default", Some("3fb13bacd9e0"));
        assert_eq!(backend.load().unwrap().versions.current("default"), None);
    }

    #[test]
    fn test_lock_covers_every_target() {
        let backend = MemoryBackend::new();
        let _held = backend.lock("default").unwrap();
        assert!(matches!(
            backend.lock("staging"),
            Err(MigrateError::ConcurrentMigrationDetected(t)) if t == "staging"
        ));
    }

    #[test]
    fn test_lock_shared_between_clones() {
        let backend = MemoryBackend::new();
        let other = backend.clone();
        let _held = backend.lock("default").unwrap();
        assert!(matches!(
            other.lock("default"),
            Err(MigrateError::ConcurrentMigrationDetected(_))
        ));
    }
}

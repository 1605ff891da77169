//! On-disk target database: the whole state in one MessagePack file,
//! replaced atomically on every commit.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{Level, event};

use super::{DatabaseState, MigrationLock, SchemaBackend};
use crate::core::{MigrateError, Result};

const FORMAT_VERSION: u32 = 1;

// ============================================================================
// State file
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    pub state: DatabaseState,
    pub metadata: StateMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateMetadata {
    pub written_at: DateTime<Utc>,
    pub table_count: usize,
}

impl StateFile {
    pub fn new(state: DatabaseState) -> Self {
        let table_count = state.catalog.list_tables().len();
        Self {
            version: FORMAT_VERSION,
            state,
            metadata: StateMetadata {
                written_at: Utc::now(),
                table_count,
            },
        }
    }
}

// ============================================================================
// File backend
// ============================================================================

#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut lock_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl SchemaBackend for FileBackend {
    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }

    fn load(&self) -> Result<DatabaseState> {
        if !self.path.exists() {
            return Ok(DatabaseState::default());
        }
        let mut file = File::open(&self.path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        let snapshot: StateFile = rmp_serde::from_slice(&data).map_err(|e| {
            MigrateError::Serialization(format!(
                "Failed to decode '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        if snapshot.version != FORMAT_VERSION {
            return Err(MigrateError::Serialization(format!(
                "Unsupported state file version {} in '{}'",
                snapshot.version,
                self.path.display()
            )));
        }
        Ok(snapshot.state)
    }

    fn commit(&self, state: DatabaseState) -> Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir)?;

        let serialized = rmp_serde::to_vec(&StateFile::new(state))
            .map_err(|e| MigrateError::Serialization(format!("Failed to encode state: {}", e)))?;

        // Same directory as the target so the rename cannot cross filesystems.
        let temp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            writer.write_all(&serialized)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| MigrateError::Io(e.error))?;

        event!(Level::DEBUG, path = %self.path.display(), bytes = serialized.len(), "state committed");
        Ok(())
    }

    fn lock(&self, target: &str) -> Result<MigrationLock> {
        fs::create_dir_all(self.parent_dir())?;
        MigrationLock::acquire_file(&self.lock_path, target)
    }
}

use std::fs::{File, OpenOptions, TryLockError};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{Level, event};

use crate::core::{MigrateError, Result};

/// Exclusive right to migrate one database. Released on drop.
///
/// The lock covers the whole database, not one bookkeeping row: every
/// target name shares the same catalog, and each commit replaces it.
#[derive(Debug)]
pub struct MigrationLock {
    target: String,
    release: LockRelease,
}

#[derive(Debug)]
enum LockRelease {
    Slot(Arc<Mutex<Option<String>>>),
    File { file: File, path: PathBuf },
}

impl MigrationLock {
    /// Claim an in-process slot shared by every clone of a backend.
    pub(crate) fn acquire_slot(slot: &Arc<Mutex<Option<String>>>, target: &str) -> Result<Self> {
        let mut holder = slot.lock()?;
        if let Some(running) = holder.as_deref() {
            event!(
                Level::WARN,
                target_name = %target,
                holder = %running,
                "database is locked by another migration"
            );
            return Err(MigrateError::ConcurrentMigrationDetected(target.to_string()));
        }
        *holder = Some(target.to_string());
        Ok(Self {
            target: target.to_string(),
            release: LockRelease::Slot(Arc::clone(slot)),
        })
    }

    /// Take an advisory lock on `path`, creating it when missing.
    ///
    /// The operating system drops the lock when the holding process exits,
    /// so a lock file left behind by a killed run does not block later runs.
    pub(crate) fn acquire_file(path: &Path, target: &str) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                return Err(MigrateError::ConcurrentMigrationDetected(target.to_string()));
            }
            Err(TryLockError::Error(e)) => return Err(e.into()),
        }

        // Holder details are informational only.
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(
            file,
            "pid={} target={} since={}",
            std::process::id(),
            target,
            chrono::Utc::now().to_rfc3339()
        )?;
        Ok(Self {
            target: target.to_string(),
            release: LockRelease::File {
                file,
                path: path.to_path_buf(),
            },
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Drop for MigrationLock {
    fn drop(&mut self) {
        match &self.release {
            LockRelease::Slot(slot) => match slot.lock() {
                Ok(mut holder) => {
                    holder.take();
                }
                Err(err) => {
                    event!(Level::ERROR, target_name = %self.target, error = %err, "failed to release migration lock");
                }
            },
            // The file stays in place; only the lock on it is released.
            LockRelease::File { file, path } => {
                if let Err(err) = file.unlock() {
                    event!(
                        Level::ERROR,
                        target_name = %self.target,
                        path = %path.display(),
                        error = %err,
                        "failed to unlock migration lock file"
                    );
                }
            }
        }
    }
}

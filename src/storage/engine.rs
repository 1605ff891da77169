use super::{DatabaseState, MigrationLock};
use crate::core::Result;

/// A target database the migrator can drive.
///
/// `commit` must replace the stored state all-or-nothing: a reader never
/// observes a catalog from one step paired with the bookkeeping row of
/// another.
pub trait SchemaBackend: Send + Sync {
    /// Human readable location, for logs.
    fn describe(&self) -> String;

    /// Read the last committed state.
    fn load(&self) -> Result<DatabaseState>;

    /// Atomically publish a new state.
    fn commit(&self, state: DatabaseState) -> Result<()>;

    /// Take the per-target migration lock.
    fn lock(&self, target: &str) -> Result<MigrationLock>;
}

impl<T: SchemaBackend + ?Sized> SchemaBackend for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn load(&self) -> Result<DatabaseState> {
        (**self).load()
    }

    fn commit(&self, state: DatabaseState) -> Result<()> {
        (**self).commit(state)
    }

    fn lock(&self, target: &str) -> Result<MigrationLock> {
        (**self).lock(target)
    }
}

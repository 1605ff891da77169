pub mod catalog;
pub mod engine;
pub mod lock;
pub mod memory;
pub mod persistence;
pub mod state;
pub mod table;

pub use catalog::Catalog;
pub use engine::SchemaBackend;
pub use lock::MigrationLock;
pub use memory::MemoryBackend;
pub use persistence::FileBackend;
pub use state::{DatabaseState, VERSION_TABLE, VersionRecord, VersionTable};
pub use table::Table;

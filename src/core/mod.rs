pub mod error;
pub mod types;
pub mod value;

pub use error::{MigrateError, Result};
pub use types::{Column, IndexDef, Row, TableDef};
pub use value::{DataType, Value};

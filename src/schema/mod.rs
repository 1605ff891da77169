pub mod naming;
pub mod ops;

pub use naming::{index_name, validate_identifier};
pub use ops::SchemaOp;

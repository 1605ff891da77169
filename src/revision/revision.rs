use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::core::{MigrateError, Result};
use crate::migrator::SchemaTransaction;
use crate::schema::SchemaOp;

/// Which way a revision is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Upgrade,
    Downgrade,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upgrade => write!(f, "upgrade"),
            Self::Downgrade => write!(f, "downgrade"),
        }
    }
}

pub type CustomOperationFn = Arc<dyn Fn(&mut SchemaTransaction) -> Result<()> + Send + Sync>;

/// One step inside a revision.
#[derive(Clone)]
pub enum Operation {
    /// DDL primitive, interpreted by the migrator.
    Schema(SchemaOp),
    /// Arbitrary change (usually data) supplied by the revision author.
    /// Never inverted automatically.
    Custom {
        label: String,
        apply: CustomOperationFn,
    },
}

impl Operation {
    pub fn label(&self) -> String {
        match self {
            Self::Schema(op) => op.label(),
            Self::Custom { label, .. } => label.clone(),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(op) => f.debug_tuple("Schema").field(op).finish(),
            Self::Custom { label, .. } => f.debug_struct("Custom").field("label", label).finish(),
        }
    }
}

impl From<SchemaOp> for Operation {
    fn from(op: SchemaOp) -> Self {
        Self::Schema(op)
    }
}

/// An immutable, versioned schema change with both directions declared.
#[derive(Debug, Clone)]
pub struct Revision {
    id: String,
    parent_id: Option<String>,
    message: String,
    created_at: Option<NaiveDateTime>,
    upgrade: Vec<Operation>,
    downgrade: Vec<Operation>,
}

impl Revision {
    pub fn new(id: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            message: String::new(),
            created_at: None,
            upgrade: Vec::new(),
            downgrade: Vec::new(),
        }
    }

    /// Build a revision from create-style primitives, deriving the downgrade
    /// by inverting them in reverse order.
    pub fn reversible<I>(id: impl Into<String>, parent_id: Option<&str>, ops: I) -> Result<Self>
    where
        I: IntoIterator<Item = SchemaOp>,
    {
        let mut revision = Self::new(id, parent_id);
        for op in ops {
            let inverse = op
                .inverse()
                .ok_or_else(|| MigrateError::IrreversibleOperation(op.label()))?;
            revision.upgrade.push(Operation::Schema(op));
            revision.downgrade.insert(0, Operation::Schema(inverse));
        }
        Ok(revision)
    }

    /// Fresh 12 hex digit identifier.
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn upgrade_op(mut self, op: SchemaOp) -> Self {
        self.upgrade.push(Operation::Schema(op));
        self
    }

    pub fn downgrade_op(mut self, op: SchemaOp) -> Self {
        self.downgrade.push(Operation::Schema(op));
        self
    }

    pub fn upgrade_with<F>(mut self, label: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&mut SchemaTransaction) -> Result<()> + Send + Sync + 'static,
    {
        self.upgrade.push(Operation::Custom {
            label: label.into(),
            apply: Arc::new(apply),
        });
        self
    }

    pub fn downgrade_with<F>(mut self, label: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&mut SchemaTransaction) -> Result<()> + Send + Sync + 'static,
    {
        self.downgrade.push(Operation::Custom {
            label: label.into(),
            apply: Arc::new(apply),
        });
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.message
    }

    pub fn create_date(&self) -> Option<NaiveDateTime> {
        self.created_at
    }

    pub fn operations(&self, direction: Direction) -> &[Operation] {
        match direction {
            Direction::Upgrade => &self.upgrade,
            Direction::Downgrade => &self.downgrade,
        }
    }
}

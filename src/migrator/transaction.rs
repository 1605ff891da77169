use tracing::{Level, event};

use crate::core::{IndexDef, Result, Row, TableDef};
use crate::revision::Operation;
use crate::schema::SchemaOp;
use crate::storage::Catalog;

/// Scoped work area for one revision step.
///
/// Operations run against a private copy of the catalog. Nothing is visible
/// to the target until the migrator commits the copy together with the new
/// bookkeeping row; dropping the transaction discards everything.
pub struct SchemaTransaction {
    catalog: Catalog,
    echo: bool,
    statements: Vec<String>,
}

impl SchemaTransaction {
    pub(crate) fn new(catalog: Catalog, echo: bool) -> Self {
        Self {
            catalog,
            echo,
            statements: Vec::new(),
        }
    }

    /// Run one DDL primitive. On error the working catalog is unchanged.
    pub fn execute(&mut self, op: &SchemaOp) -> Result<()> {
        self.catalog = self.catalog.clone().apply(op)?;
        let sql = op.to_string();
        if self.echo {
            event!(Level::INFO, table = %op.table_name(), sql = %sql, "ddl");
        }
        self.statements.push(sql);
        Ok(())
    }

    pub fn create_table(&mut self, def: TableDef) -> Result<()> {
        self.execute(&SchemaOp::create_table(def))
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.execute(&SchemaOp::drop_table(name))
    }

    pub fn create_index(&mut self, index: IndexDef) -> Result<()> {
        self.execute(&SchemaOp::create_index(index))
    }

    pub fn drop_index(&mut self, table: &str, name: &str) -> Result<()> {
        self.execute(&SchemaOp::drop_index(table, name))
    }

    pub fn insert(&mut self, table: &str, row: Row) -> Result<()> {
        self.catalog = self.catalog.clone().with_row(table, row)?;
        Ok(())
    }

    pub fn rows(&self, table: &str) -> Result<&[Row]> {
        Ok(self.catalog.get_table(table)?.rows())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// DDL issued so far, as SQL text.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub(crate) fn run(&mut self, operation: &Operation) -> Result<()> {
        match operation {
            Operation::Schema(op) => self.execute(op),
            Operation::Custom { label, apply } => {
                event!(Level::DEBUG, operation = %label, "custom operation");
                apply(self)
            }
        }
    }

    pub(crate) fn finish(self) -> (Catalog, Vec<String>) {
        (self.catalog, self.statements)
    }
}

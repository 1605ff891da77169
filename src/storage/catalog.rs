use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Table;
use crate::core::{IndexDef, MigrateError, Result, Row, TableDef};
use crate::schema::{SchemaOp, validate_identifier};

/// Schema of the target database.
///
/// Immutable: every change returns a new `Catalog` (copy-on-write), so a
/// migration step can work on its own copy and either publish it or drop it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    tables: Arc<BTreeMap<String, Table>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one DDL primitive, returning the new catalog.
    pub fn apply(self, op: &SchemaOp) -> Result<Self> {
        match op {
            SchemaOp::CreateTable(def) => self.with_table(def.clone()),
            SchemaOp::DropTable { name } => self.without_table(name),
            SchemaOp::CreateIndex(index) => self.with_index(index.clone()),
            SchemaOp::DropIndex { table, name } => self.without_index(table, name),
        }
    }

    pub fn with_table(self, def: TableDef) -> Result<Self> {
        validate_identifier(&def.name)?;
        for column in &def.columns {
            validate_identifier(&column.name)?;
        }
        def.validate()?;

        if self.tables.contains_key(&def.name) {
            return Err(MigrateError::TableExists(def.name));
        }

        let mut new_tables = (*self.tables).clone();
        new_tables.insert(def.name.clone(), Table::new(def));
        Ok(Self {
            tables: Arc::new(new_tables),
        })
    }

    /// Drop a table together with its indexes and rows.
    pub fn without_table(self, name: &str) -> Result<Self> {
        if !self.tables.contains_key(name) {
            return Err(MigrateError::TableNotFound(name.to_string()));
        }

        let mut new_tables = (*self.tables).clone();
        new_tables.remove(name);
        Ok(Self {
            tables: Arc::new(new_tables),
        })
    }

    pub fn with_index(self, index: IndexDef) -> Result<Self> {
        validate_identifier(&index.name)?;
        if index.columns.is_empty() {
            return Err(MigrateError::ExecutionError(format!(
                "Index '{}' must cover at least one column",
                index.name
            )));
        }
        // Index names share one namespace across tables.
        if self.find_index(&index.name).is_some() {
            return Err(MigrateError::IndexExists(index.name));
        }

        let mut new_tables = (*self.tables).clone();
        let table = new_tables
            .get_mut(&index.table)
            .ok_or_else(|| MigrateError::TableNotFound(index.table.clone()))?;
        table.add_index(index)?;
        Ok(Self {
            tables: Arc::new(new_tables),
        })
    }

    pub fn without_index(self, table_name: &str, index_name: &str) -> Result<Self> {
        let mut new_tables = (*self.tables).clone();
        let table = new_tables
            .get_mut(table_name)
            .ok_or_else(|| MigrateError::TableNotFound(table_name.to_string()))?;
        table.remove_index(index_name)?;
        Ok(Self {
            tables: Arc::new(new_tables),
        })
    }

    pub fn with_row(self, table_name: &str, row: Row) -> Result<Self> {
        let mut new_tables = (*self.tables).clone();
        let table = new_tables
            .get_mut(table_name)
            .ok_or_else(|| MigrateError::TableNotFound(table_name.to_string()))?;
        table.insert(row)?;
        Ok(Self {
            tables: Arc::new(new_tables),
        })
    }

    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| MigrateError::TableNotFound(name.to_string()))
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn find_index(&self, name: &str) -> Option<&IndexDef> {
        self.tables.values().find_map(|table| table.get_index(name))
    }

    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType};

    fn school_table() -> TableDef {
        TableDef::new("school")
            .column(Column::new("id", DataType::Integer).not_null())
            .column(Column::new("code", DataType::String(1)).not_null())
            .primary_key(["id"])
    }

    #[test]
    fn test_copy_on_write_leaves_original_untouched() {
        let original = Catalog::new();
        let updated = original.clone().with_table(school_table()).unwrap();
        assert!(!original.table_exists("school"));
        assert!(updated.table_exists("school"));
    }

    #[test]
    fn test_duplicate_table() {
        let catalog = Catalog::new().with_table(school_table()).unwrap();
        assert!(matches!(
            catalog.with_table(school_table()),
            Err(MigrateError::TableExists(name)) if name == "school"
        ));
    }

    #[test]
    fn test_index_names_are_global() {
        let catalog = Catalog::new()
            .with_table(school_table())
            .unwrap()
            .with_table(TableDef::new("spell").column(Column::new("code", DataType::Text)))
            .unwrap()
            .with_index(IndexDef::new("ix_code", "school", ["code"]))
            .unwrap();
        assert!(matches!(
            catalog.with_index(IndexDef::new("ix_code", "spell", ["code"])),
            Err(MigrateError::IndexExists(_))
        ));
    }

    #[test]
    fn test_drop_table_drops_indexes() {
        let catalog = Catalog::new()
            .with_table(school_table())
            .unwrap()
            .with_index(IndexDef::new("ix_school_code", "school", ["code"]).unique())
            .unwrap()
            .without_table("school")
            .unwrap();
        assert!(catalog.find_index("ix_school_code").is_none());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_rejects_bad_identifiers() {
        let def = TableDef::new("spell list").column(Column::new("id", DataType::Integer));
        assert!(matches!(
            Catalog::new().with_table(def),
            Err(MigrateError::InvalidIdentifier(_))
        ));
    }
}

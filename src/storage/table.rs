use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{IndexDef, MigrateError, Result, Row, TableDef, Value};

/// A live table in the target database: its definition, the indexes built
/// on it and the rows it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    def: TableDef,
    indexes: BTreeMap<String, IndexDef>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(def: TableDef) -> Self {
        Self {
            def,
            indexes: BTreeMap::new(),
            rows: Vec::new(),
        }
    }

    pub fn def(&self) -> &TableDef {
        &self.def
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn indexes(&self) -> impl Iterator<Item = &IndexDef> {
        self.indexes.values()
    }

    pub fn get_index(&self, name: &str) -> Option<&IndexDef> {
        self.indexes.get(name)
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn add_index(&mut self, index: IndexDef) -> Result<()> {
        if self.indexes.contains_key(&index.name) {
            return Err(MigrateError::IndexExists(index.name));
        }
        let positions = self.column_positions(&index.columns)?;
        if index.unique {
            let mut seen: Vec<Vec<&Value>> = Vec::with_capacity(self.rows.len());
            for row in &self.rows {
                let key = Self::key_of(row, &positions);
                if key.iter().any(|v| v.is_null()) {
                    continue;
                }
                if seen.contains(&key) {
                    return Err(MigrateError::ConstraintViolation(format!(
                        "Cannot create unique index '{}': duplicate values in ({})",
                        index.name,
                        index.columns.join(", ")
                    )));
                }
                seen.push(key);
            }
        }
        self.indexes.insert(index.name.clone(), index);
        Ok(())
    }

    pub fn remove_index(&mut self, name: &str) -> Result<IndexDef> {
        self.indexes
            .remove(name)
            .ok_or_else(|| MigrateError::IndexNotFound(name.to_string()))
    }

    /// Insert a full row, filling `Null` cells from column defaults.
    pub fn insert(&mut self, mut row: Row) -> Result<()> {
        let columns = &self.def.columns;
        if row.len() != columns.len() {
            return Err(MigrateError::ExecutionError(format!(
                "Expected {} columns, got {}",
                columns.len(),
                row.len()
            )));
        }
        for (column, value) in columns.iter().zip(row.iter_mut()) {
            if value.is_null()
                && let Some(default) = &column.default
            {
                *value = default.clone();
            }
            column.validate(value)?;
        }
        self.check_uniqueness(&row)?;
        self.rows.push(row);
        Ok(())
    }

    fn check_uniqueness(&self, row: &Row) -> Result<()> {
        let mut keys: Vec<(&str, &[String])> = Vec::new();
        if !self.def.primary_key.is_empty() {
            keys.push(("PRIMARY KEY", self.def.primary_key.as_slice()));
        }
        for index in self.indexes.values().filter(|idx| idx.unique) {
            keys.push((index.name.as_str(), index.columns.as_slice()));
        }

        for (constraint, columns) in keys {
            let positions = self.column_positions(columns)?;
            let candidate = Self::key_of(row, &positions);
            if candidate.iter().any(|v| v.is_null()) {
                continue;
            }
            if self
                .rows
                .iter()
                .any(|existing| Self::key_of(existing, &positions) == candidate)
            {
                return Err(MigrateError::ConstraintViolation(format!(
                    "Unique constraint '{}' violated on table '{}'",
                    constraint,
                    self.name()
                )));
            }
        }
        Ok(())
    }

    fn column_positions(&self, columns: &[String]) -> Result<Vec<usize>> {
        columns
            .iter()
            .map(|col| {
                self.def
                    .find_column_index(col)
                    .ok_or_else(|| MigrateError::ColumnNotFound(col.clone(), self.def.name.clone()))
            })
            .collect()
    }

    fn key_of<'a>(row: &'a Row, positions: &[usize]) -> Vec<&'a Value> {
        positions.iter().map(|&idx| &row[idx]).collect()
    }
}

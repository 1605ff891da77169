// ============================================================================
// Schema Operations
// ============================================================================
//
// The DDL primitives a revision is made of. Each primitive renders to SQL
// and, where the inverse is purely syntactic, knows its own inverse.
//
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{IndexDef, TableDef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchemaOp {
    CreateTable(TableDef),
    DropTable { name: String },
    CreateIndex(IndexDef),
    DropIndex { table: String, name: String },
}

impl SchemaOp {
    pub fn create_table(def: TableDef) -> Self {
        Self::CreateTable(def)
    }

    pub fn drop_table(name: impl Into<String>) -> Self {
        Self::DropTable { name: name.into() }
    }

    pub fn create_index(index: IndexDef) -> Self {
        Self::CreateIndex(index)
    }

    pub fn drop_index(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DropIndex {
            table: table.into(),
            name: name.into(),
        }
    }

    /// Table the operation touches.
    pub fn table_name(&self) -> &str {
        match self {
            Self::CreateTable(def) => &def.name,
            Self::DropTable { name } => name,
            Self::CreateIndex(index) => &index.table,
            Self::DropIndex { table, .. } => table,
        }
    }

    /// Short label used in logs and error messages.
    pub fn label(&self) -> String {
        match self {
            Self::CreateTable(def) => format!("create_table({})", def.name),
            Self::DropTable { name } => format!("drop_table({})", name),
            Self::CreateIndex(index) => format!("create_index({})", index.name),
            Self::DropIndex { name, .. } => format!("drop_index({})", name),
        }
    }

    /// Syntactic inverse. Drops carry no definition to recreate from, so
    /// they have none.
    pub fn inverse(&self) -> Option<SchemaOp> {
        match self {
            Self::CreateTable(def) => Some(Self::drop_table(def.name.clone())),
            Self::CreateIndex(index) => {
                Some(Self::drop_index(index.table.clone(), index.name.clone()))
            }
            Self::DropTable { .. } | Self::DropIndex { .. } => None,
        }
    }
}

impl fmt::Display for SchemaOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateTable(def) => {
                writeln!(f, "CREATE TABLE {} (", def.name)?;
                let mut lines = Vec::with_capacity(def.columns.len() + 1);
                for column in &def.columns {
                    let mut line = format!("    {} {}", column.name, column.data_type);
                    if !column.nullable {
                        line.push_str(" NOT NULL");
                    }
                    if let Some(default) = &column.default {
                        line.push_str(" DEFAULT ");
                        line.push_str(&default.to_sql_literal());
                    }
                    lines.push(line);
                }
                if !def.primary_key.is_empty() {
                    lines.push(format!("    PRIMARY KEY ({})", def.primary_key.join(", ")));
                }
                writeln!(f, "{}", lines.join(",\n"))?;
                write!(f, ");")
            }
            Self::DropTable { name } => write!(f, "DROP TABLE {};", name),
            Self::CreateIndex(index) => write!(
                f,
                "CREATE {}INDEX {} ON {} ({});",
                if index.unique { "UNIQUE " } else { "" },
                index.name,
                index.table,
                index.columns.join(", ")
            ),
            Self::DropIndex { name, .. } => write!(f, "DROP INDEX {};", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType};

    #[test]
    fn test_create_inverts_to_drop() {
        let create = SchemaOp::create_index(IndexDef::new("ix_spell_name", "spell", ["name"]).unique());
        assert_eq!(
            create.inverse(),
            Some(SchemaOp::drop_index("spell", "ix_spell_name"))
        );
        assert_eq!(SchemaOp::drop_table("spell").inverse(), None);
    }

    #[test]
    fn test_render_create_table() {
        let op = SchemaOp::create_table(
            TableDef::new("spell")
                .column(Column::new("id", DataType::Integer).not_null())
                .column(Column::new("school", DataType::String(1)).not_null())
                .column(Column::new("ritual", DataType::Boolean).default_value(false))
                .primary_key(["id"]),
        );
        let sql = op.to_string();
        assert!(sql.starts_with("CREATE TABLE spell ("));
        assert!(sql.contains("    school VARCHAR(1) NOT NULL,"));
        assert!(sql.contains("    ritual BOOLEAN DEFAULT FALSE,"));
        assert!(sql.ends_with("    PRIMARY KEY (id)\n);"));
    }

    #[test]
    fn test_render_indexes() {
        let unique = SchemaOp::create_index(IndexDef::new("ix_spell_name", "spell", ["name"]).unique());
        assert_eq!(unique.to_string(), "CREATE UNIQUE INDEX ix_spell_name ON spell (name);");
        assert_eq!(
            SchemaOp::drop_index("spell", "ix_spell_name").to_string(),
            "DROP INDEX ix_spell_name;"
        );
    }

    #[test]
    fn test_table_name_of_index_ops() {
        let create = SchemaOp::create_index(IndexDef::new("ix_spell_name", "spell", ["name"]));
        assert_eq!(create.table_name(), "spell");
        assert_eq!(SchemaOp::drop_index("spell", "ix_spell_name").table_name(), "spell");
        assert_eq!(SchemaOp::drop_table("spell").table_name(), "spell");
    }
}

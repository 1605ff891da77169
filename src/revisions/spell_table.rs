//! spell_table
//!
//! Revision ID: d4d2b2fce5f8
//! Revises: 3fb13bacd9e0
//! Create Date: 2023-07-25 16:37:15.732591

use chrono::NaiveDate;

use crate::core::{Column, DataType, IndexDef, TableDef};
use crate::revision::Revision;
use crate::schema::{SchemaOp, index_name};

pub const REVISION: &str = "d4d2b2fce5f8";
pub const DOWN_REVISION: &str = "3fb13bacd9e0";

pub const TABLE: &str = "spell";

pub fn spell_table() -> TableDef {
    TableDef::new(TABLE)
        .column(Column::new("name", DataType::String(255)).not_null())
        .column(Column::new("level", DataType::Integer).not_null())
        .column(Column::new("school", DataType::String(1)).not_null())
        .column(Column::new("json_data", DataType::Json).not_null())
        .column(Column::new("id", DataType::Integer).not_null())
        .column(Column::new("created_at", DataType::DateTime).not_null())
        .column(Column::new("updated_at", DataType::DateTime).not_null())
        .primary_key(["id"])
}

pub fn revision() -> Revision {
    let created_at = NaiveDate::from_ymd_opt(2023, 7, 25)
        .and_then(|d| d.and_hms_micro_opt(16, 37, 15, 732_591));

    let revision = Revision::new(REVISION, Some(DOWN_REVISION))
        .message("spell_table")
        .upgrade_op(SchemaOp::create_table(spell_table()))
        .upgrade_op(SchemaOp::create_index(IndexDef::new(
            index_name(TABLE, &["created_at"]),
            TABLE,
            ["created_at"],
        )))
        .upgrade_op(SchemaOp::create_index(
            IndexDef::new(index_name(TABLE, &["name"]), TABLE, ["name"]).unique(),
        ))
        .downgrade_op(SchemaOp::drop_index(TABLE, index_name(TABLE, &["name"])))
        .downgrade_op(SchemaOp::drop_index(TABLE, index_name(TABLE, &["created_at"])))
        .downgrade_op(SchemaOp::drop_table(TABLE));

    match created_at {
        Some(created_at) => revision.created_at(created_at),
        None => revision,
    }
}

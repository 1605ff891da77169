use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Catalog;

/// Name under which the bookkeeping table is shown to users.
pub const VERSION_TABLE: &str = "schema_revision";

/// One row of the bookkeeping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub revision_id: String,
    pub applied_at: DateTime<Utc>,
}

/// Bookkeeping table: `(target_name, revision_id)`, one row per target.
/// A missing row means the target is unmigrated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionTable {
    rows: BTreeMap<String, VersionRecord>,
}

impl VersionTable {
    pub fn get(&self, target: &str) -> Option<&VersionRecord> {
        self.rows.get(target)
    }

    pub fn current(&self, target: &str) -> Option<&str> {
        self.rows.get(target).map(|r| r.revision_id.as_str())
    }

    /// Point `target` at `revision_id`, or delete its row for base.
    pub fn set(&mut self, target: &str, revision_id: Option<&str>) {
        match revision_id {
            Some(id) => {
                self.rows.insert(
                    target.to_string(),
                    VersionRecord {
                        revision_id: id.to_string(),
                        applied_at: Utc::now(),
                    },
                );
            }
            None => {
                self.rows.remove(target);
            }
        }
    }

    pub fn targets(&self) -> impl Iterator<Item = (&str, &VersionRecord)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Everything a commit replaces atomically: the schema and the bookkeeping
/// table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatabaseState {
    pub catalog: Catalog,
    pub versions: VersionTable,
}

//! Revisions of the 5e sheets database, oldest first.
//!
//! Add a module per revision and list it in [`all`]. `sheets-migrate revision`
//! prints a fresh id to use.

pub mod baseline;
pub mod spell_table;

use crate::core::Result;
use crate::revision::{Revision, RevisionGraph};

pub fn all() -> Vec<Revision> {
    vec![baseline::revision(), spell_table::revision()]
}

/// The validated graph of every known revision.
pub fn graph() -> Result<RevisionGraph> {
    RevisionGraph::new(all())
}

//! Baseline: the empty schema every later revision builds on.
//!
//! Revision ID: 3fb13bacd9e0
//! Revises: <base>

use crate::revision::Revision;

pub const REVISION: &str = "3fb13bacd9e0";

pub fn revision() -> Revision {
    Revision::new(REVISION, None).message("baseline")
}

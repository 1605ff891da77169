use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::revision::Direction;

/// One committed revision step.
#[derive(Debug, Clone)]
pub struct AppliedStep {
    pub revision: String,
    pub description: String,
    /// DDL issued by the step, in order.
    pub statements: Vec<String>,
    pub operations: usize,
    pub elapsed: Duration,
}

/// Outcome of a successful migration run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub direction: Direction,
    pub from: Option<String>,
    pub to: Option<String>,
    pub steps: Vec<AppliedStep>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total operations executed across all steps.
    pub fn operation_count(&self) -> usize {
        self.steps.iter().map(|s| s.operations).sum()
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = self.from.as_deref().unwrap_or("base");
        let to = self.to.as_deref().unwrap_or("base");
        if self.is_noop() {
            return write!(f, "Already at {}", to);
        }
        write!(
            f,
            "{} {} -> {} ({} revision{})",
            self.direction,
            from,
            to,
            self.steps.len(),
            if self.steps.len() == 1 { "" } else { "s" }
        )
    }
}

/// Statements a run would issue, without running them.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    pub revision: String,
    pub description: String,
    pub statements: Vec<String>,
}

/// One line of `history`.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub revision: String,
    pub parent: Option<String>,
    pub description: String,
    pub created_at: Option<NaiveDateTime>,
    pub applied: bool,
    pub current: bool,
    pub head: bool,
    pub applied_at: Option<DateTime<Utc>>,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.parent.as_deref().unwrap_or("<base>"),
            self.revision
        )?;
        let mut tags = Vec::new();
        if self.head {
            tags.push("head");
        }
        if self.current {
            tags.push("current");
        }
        if !tags.is_empty() {
            write!(f, " ({})", tags.join(", "))?;
        }
        if !self.description.is_empty() {
            write!(f, ", {}", self.description)?;
        }
        Ok(())
    }
}

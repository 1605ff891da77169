use std::time::Instant;

use tracing::{Level, event, info_span};

use super::{AppliedStep, HistoryEntry, MigrationReport, PlannedStep, SchemaTransaction};
use crate::core::{MigrateError, Result};
use crate::revision::{Direction, MigrationPath, Operation, Revision, RevisionGraph, TargetSpec};
use crate::storage::{DatabaseState, SchemaBackend, VersionRecord};

pub const DEFAULT_TARGET: &str = "default";

/// Moves one target database along the revision graph.
///
/// A run holds the target's migration lock throughout. Each revision is its
/// own transaction: its operations and the bookkeeping update are committed
/// together, then the next revision starts from the freshly committed state.
pub struct Migrator<B: SchemaBackend> {
    graph: RevisionGraph,
    backend: B,
    target: String,
    echo: bool,
}

impl<B: SchemaBackend> Migrator<B> {
    pub fn new(graph: RevisionGraph, backend: B) -> Self {
        Self {
            graph,
            backend,
            target: DEFAULT_TARGET.to_string(),
            echo: false,
        }
    }

    /// Name of the row in the bookkeeping table this migrator owns.
    pub fn target_name(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Log every DDL statement as it is executed.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn graph(&self) -> &RevisionGraph {
        &self.graph
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Revision currently recorded for the target, `None` when unmigrated.
    pub fn current(&self) -> Result<Option<String>> {
        Ok(self.current_record()?.map(|record| record.revision_id))
    }

    pub fn current_record(&self) -> Result<Option<VersionRecord>> {
        let state = self.backend.load()?;
        self.recorded(&state).map(|r| r.cloned())
    }

    fn recorded<'s>(&self, state: &'s DatabaseState) -> Result<Option<&'s VersionRecord>> {
        match state.versions.get(&self.target) {
            Some(record) if !self.graph.contains(&record.revision_id) => {
                Err(MigrateError::UnknownRevision(record.revision_id.clone()))
            }
            record => Ok(record),
        }
    }

    pub fn upgrade_to(&self, target_id: &str) -> Result<MigrationReport> {
        self.run(Some(Direction::Upgrade), &TargetSpec::Revision(target_id.to_string()))
    }

    pub fn downgrade_to(&self, target_id: &str) -> Result<MigrationReport> {
        self.run(Some(Direction::Downgrade), &TargetSpec::Revision(target_id.to_string()))
    }

    pub fn upgrade_to_latest(&self) -> Result<MigrationReport> {
        self.run(Some(Direction::Upgrade), &TargetSpec::Head)
    }

    pub fn downgrade_to_base(&self) -> Result<MigrationReport> {
        self.run(Some(Direction::Downgrade), &TargetSpec::Base)
    }

    /// Upgrade to any target spec; refuses to move backwards.
    pub fn upgrade(&self, spec: &TargetSpec) -> Result<MigrationReport> {
        self.run(Some(Direction::Upgrade), spec)
    }

    /// Downgrade to any target spec; refuses to move forwards.
    pub fn downgrade(&self, spec: &TargetSpec) -> Result<MigrationReport> {
        self.run(Some(Direction::Downgrade), spec)
    }

    /// Move to `spec` in whichever direction the graph requires.
    pub fn migrate_to(&self, spec: &TargetSpec) -> Result<MigrationReport> {
        self.run(None, spec)
    }

    /// Record `spec` as current without running any operation.
    pub fn stamp(&self, spec: &TargetSpec) -> Result<Option<String>> {
        let _lock = self.backend.lock(&self.target)?;
        let mut state = self.backend.load()?;
        let current = self.recorded(&state)?.map(|r| r.revision_id.clone());
        let destination = self.graph.resolve(spec, current.as_deref())?;

        state.versions.set(&self.target, destination.as_deref());
        self.backend.commit(state)?;
        event!(
            Level::INFO,
            target_name = %self.target,
            revision = %or_base(destination.as_deref()),
            "stamped"
        );
        Ok(destination)
    }

    /// DDL a run towards `spec` would issue, without touching the target.
    /// Custom operations show up as SQL comments.
    pub fn plan(&self, direction: Direction, spec: &TargetSpec) -> Result<Vec<PlannedStep>> {
        let current = self.current()?;
        let destination = self.graph.resolve(spec, current.as_deref())?;
        let path = self.graph.path_from(current.as_deref(), destination.as_deref())?;
        check_direction(Some(direction), &path)?;

        Ok(path
            .steps
            .iter()
            .map(|revision| PlannedStep {
                revision: revision.id().to_string(),
                description: revision.description().to_string(),
                statements: revision
                    .operations(path.direction)
                    .iter()
                    .map(|op| match op {
                        Operation::Schema(op) => op.to_string(),
                        Operation::Custom { label, .. } => format!("-- custom operation: {}", label),
                    })
                    .collect(),
            })
            .collect())
    }

    /// [`plan`](Self::plan) as a single SQL script.
    pub fn render_sql(&self, direction: Direction, spec: &TargetSpec) -> Result<String> {
        let mut script = String::new();
        for step in self.plan(direction, spec)? {
            script.push_str(&format!("-- Running {} {}\n", step.revision, step.description));
            for statement in &step.statements {
                script.push_str(statement);
                script.push('\n');
            }
            script.push('\n');
        }
        Ok(script)
    }

    /// Every known revision, root first, flagged against the target's state.
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        let record = self.current_record()?;
        let current_pos = self
            .graph
            .position(record.as_ref().map(|r| r.revision_id.as_str()))?;
        let head = self.graph.head().map(Revision::id);

        Ok(self
            .graph
            .iter()
            .enumerate()
            .map(|(idx, revision)| {
                let is_current = current_pos == Some(idx);
                HistoryEntry {
                    revision: revision.id().to_string(),
                    parent: revision.parent_id().map(str::to_string),
                    description: revision.description().to_string(),
                    created_at: revision.create_date(),
                    applied: current_pos.is_some_and(|pos| idx <= pos),
                    current: is_current,
                    head: head == Some(revision.id()),
                    applied_at: if is_current {
                        record.as_ref().map(|r| r.applied_at)
                    } else {
                        None
                    },
                }
            })
            .collect())
    }

    fn run(&self, direction: Option<Direction>, spec: &TargetSpec) -> Result<MigrationReport> {
        let span = info_span!("migrate.run", target_name = %self.target, destination = %spec);
        let _enter = span.enter();

        let _lock = self.backend.lock(&self.target)?;

        let current = self.current()?;
        let destination = self.graph.resolve(spec, current.as_deref())?;
        let path = self.graph.path_from(current.as_deref(), destination.as_deref())?;
        check_direction(direction, &path)?;

        let mut report = MigrationReport {
            direction: direction.unwrap_or(path.direction),
            from: current.clone(),
            to: destination.clone(),
            steps: Vec::with_capacity(path.len()),
        };

        if path.is_empty() {
            event!(Level::INFO, revision = %or_base(current.as_deref()), "already at target");
            return Ok(report);
        }

        event!(
            Level::INFO,
            direction = %path.direction,
            from = %or_base(current.as_deref()),
            to = %or_base(destination.as_deref()),
            steps = path.len(),
            backend = %self.backend.describe(),
            "migration started"
        );

        for revision in &path.steps {
            let step = self.apply_step(&path, revision)?;
            report.steps.push(step);
        }

        event!(Level::INFO, steps = report.steps.len(), "migration finished");
        Ok(report)
    }

    fn apply_step(&self, path: &MigrationPath<'_>, revision: &Revision) -> Result<AppliedStep> {
        let direction = path.direction;
        let span = info_span!("migrate.step", revision = %revision.id(), direction = %direction);
        let _enter = span.enter();
        let started = Instant::now();

        let fail = |source: MigrateError| {
            event!(Level::ERROR, error = %source, "revision failed");
            MigrateError::OperationFailure {
                revision: revision.id().to_string(),
                direction,
                source: Box::new(source),
            }
        };

        let state = self.backend.load().map_err(fail)?;
        let expected = match direction {
            Direction::Upgrade => revision.parent_id(),
            Direction::Downgrade => Some(revision.id()),
        };
        if state.versions.current(&self.target) != expected {
            // Someone moved the pointer underneath the lock.
            return Err(MigrateError::ConcurrentMigrationDetected(self.target.clone()));
        }

        let operations = revision.operations(direction);
        let mut txn = SchemaTransaction::new(state.catalog, self.echo);
        for operation in operations {
            event!(Level::DEBUG, operation = %operation.label(), "running operation");
            txn.run(operation).map_err(fail)?;
        }
        let (catalog, statements) = txn.finish();

        let mut versions = state.versions;
        versions.set(&self.target, path.resulting_revision(revision));
        self.backend
            .commit(DatabaseState { catalog, versions })
            .map_err(fail)?;

        let elapsed = started.elapsed();
        event!(
            Level::INFO,
            operations = operations.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "revision committed"
        );

        Ok(AppliedStep {
            revision: revision.id().to_string(),
            description: revision.description().to_string(),
            statements,
            operations: operations.len(),
            elapsed,
        })
    }
}

fn check_direction(direction: Option<Direction>, path: &MigrationPath<'_>) -> Result<()> {
    match direction {
        Some(wanted) if !path.is_empty() && wanted != path.direction => {
            Err(MigrateError::InvalidDirection {
                direction: wanted,
                from: or_base(path.from.as_deref()).to_string(),
                to: or_base(path.to.as_deref()).to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn or_base(revision: Option<&str>) -> &str {
    revision.unwrap_or("base")
}

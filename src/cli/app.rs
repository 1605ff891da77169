use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use sheets_migrate::storage::VERSION_TABLE;
use sheets_migrate::{
    Direction, MigrateConfig, Migrator, Revision, SchemaBackend, TargetSpec, logging, revisions,
};

use super::{Cli, Command};

pub fn run(cli: Cli) -> Result<()> {
    if let Command::Revision { message, out } = &cli.command {
        return new_revision(message.as_deref(), out.as_deref());
    }

    let config = MigrateConfig::new()
        .database_url(&cli.db)?
        .target(&cli.target_name)?
        .echo(cli.echo)
        .log_level(cli.log_level)
        .log_format(cli.log_format);
    logging::init(config.log_level, config.log_format)?;

    let migrator = sheets_migrate::open(&config).context("Failed to load the revision graph")?;

    match cli.command {
        Command::Upgrade { revision, sql } => {
            if sql {
                print!("{}", migrator.render_sql(Direction::Upgrade, &revision)?);
                return Ok(());
            }
            let report = migrator
                .upgrade(&revision)
                .with_context(|| format!("Upgrade to '{}' failed", revision))?;
            print_report(&report);
            Ok(())
        }
        Command::Downgrade { revision, sql } => {
            if sql {
                print!("{}", migrator.render_sql(Direction::Downgrade, &revision)?);
                return Ok(());
            }
            let report = migrator
                .downgrade(&revision)
                .with_context(|| format!("Downgrade to '{}' failed", revision))?;
            print_report(&report);
            Ok(())
        }
        Command::Current => {
            match migrator.current_record()? {
                Some(record) => println!(
                    "{} (applied {})",
                    record.revision_id,
                    record.applied_at.format("%Y-%m-%d %H:%M:%S")
                ),
                None => println!("base"),
            }
            Ok(())
        }
        Command::History { json } => {
            let history = migrator.history()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                for entry in history.iter().rev() {
                    println!("{}", entry);
                }
            }
            Ok(())
        }
        Command::Stamp { revision } => {
            let stamped = migrator
                .stamp(&revision)
                .with_context(|| format!("Stamp '{}' failed", revision))?;
            println!("Stamped {}", stamped.as_deref().unwrap_or("base"));
            Ok(())
        }
        Command::Check => check(&migrator),
        Command::Revision { .. } => Ok(()),
    }
}

fn check<B: SchemaBackend>(migrator: &Migrator<B>) -> Result<()> {
    let graph = migrator.graph();
    let head = graph
        .head()
        .map(Revision::id)
        .ok_or_else(|| anyhow!("No revisions defined"))?;
    let current = migrator
        .current()
        .with_context(|| format!("Target '{}' records a revision outside the graph", migrator.target()))?;
    let pending = migrator.plan(Direction::Upgrade, &TargetSpec::Head)?;

    println!("{} revisions, head {}", graph.len(), head);
    println!(
        "{} row '{}' at {}, {} pending",
        VERSION_TABLE,
        migrator.target(),
        current.as_deref().unwrap_or("base"),
        pending.len()
    );
    Ok(())
}

fn print_report(report: &sheets_migrate::MigrationReport) {
    println!("{}", report);
    for step in &report.steps {
        println!(
            "  {} {} ({} operations, {} ms)",
            step.revision,
            step.description,
            step.operations,
            step.elapsed.as_millis()
        );
    }
}

fn new_revision(message: Option<&str>, out: Option<&Path>) -> Result<()> {
    let id = Revision::generate_id();
    let Some(out) = out else {
        println!("{}", id);
        return Ok(());
    };

    let graph = revisions::graph().context("Failed to load the revision graph")?;
    let parent = graph.head().map(Revision::id);
    let message = message.unwrap_or("new revision");
    let parent_arg = match parent {
        Some(parent) => format!("Some(\"{}\")", parent),
        None => "None".to_string(),
    };

    let content = format!(
        "//! {message}\n//!\n//! Revision ID: {id}\n//! Revises: {revises}\n//! Create Date: {date}\n\nuse crate::revision::Revision;\n\npub const REVISION: &str = \"{id}\";\n\npub fn revision() -> Revision {{\n    Revision::new(REVISION, {parent_arg})\n        .message(\"{escaped}\")\n        // .upgrade_op(SchemaOp::create_table(...))\n        // .downgrade_op(SchemaOp::drop_table(...))\n}}\n",
        message = message,
        id = id,
        revises = parent.unwrap_or("<base>"),
        date = Utc::now().naive_utc(),
        parent_arg = parent_arg,
        escaped = message.replace('"', "\\\""),
    );

    if let Some(dir) = out.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create parent directory '{}'", dir.display()))?;
    }
    fs::write(out, content)
        .with_context(|| format!("Failed to write revision template to '{}'", out.display()))?;

    println!("Generated revision {}: {}", id, out.display());
    Ok(())
}

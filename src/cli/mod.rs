pub mod app;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sheets_migrate::migrator::DEFAULT_TARGET;
use sheets_migrate::{LogFormat, LogLevel, TargetSpec};

#[derive(Parser)]
#[command(name = "sheets-migrate")]
#[command(about = "Schema migrations for the 5e sheets database")]
pub struct Cli {
    /// Database location: memory://, file://<path> or a bare path
    #[arg(long, global = true, env = "DB_URI", default_value = "file://db/5esheets.db")]
    pub db: String,

    /// Row in the bookkeeping table to read and update
    #[arg(long = "target-name", global = true, env = "MIGRATE_TARGET", default_value = DEFAULT_TARGET)]
    pub target_name: String,

    /// Log every DDL statement
    #[arg(long, global = true, env = "SQL_ECHO")]
    pub echo: bool,

    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "INFO")]
    pub log_level: LogLevel,

    #[arg(long, global = true, env = "LOG_FORMAT", default_value = "plain")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upgrade to a later revision (default: head)
    Upgrade {
        #[arg(default_value = "head", allow_hyphen_values = true)]
        revision: TargetSpec,
        /// Print the DDL instead of running it
        #[arg(long)]
        sql: bool,
    },
    /// Revert to an earlier revision, or `base`
    Downgrade {
        #[arg(allow_hyphen_values = true)]
        revision: TargetSpec,
        /// Print the DDL instead of running it
        #[arg(long)]
        sql: bool,
    },
    /// Show the revision recorded for the target
    Current,
    /// List every revision, root first
    History {
        #[arg(long)]
        json: bool,
    },
    /// Record a revision as current without running it
    Stamp {
        #[arg(allow_hyphen_values = true)]
        revision: TargetSpec,
    },
    /// Validate the revision graph and the recorded revision
    Check,
    /// Print a fresh revision id, or write a revision template
    Revision {
        #[arg(short, long)]
        message: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

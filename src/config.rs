use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::{MigrateError, Result};
use crate::migrator::DEFAULT_TARGET;
use crate::storage::{FileBackend, MemoryBackend, SchemaBackend};

pub const DEFAULT_DB_PATH: &str = "db/5esheets.db";

/// Where the target database lives.
///
/// Accepted forms: `memory://`, `file://<path>`, or a bare path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUri {
    Memory,
    File(PathBuf),
}

impl DatabaseUri {
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(MigrateError::Config("DB_URI must not be empty".to_string()));
        }
        if uri == "memory" || uri == "memory://" {
            return Ok(Self::Memory);
        }
        if let Some(path) = uri.strip_prefix("file://") {
            if path.is_empty() {
                return Err(MigrateError::Config(format!("DB_URI '{}' has no path", uri)));
            }
            return Ok(Self::File(PathBuf::from(path)));
        }
        if let Some((scheme, _)) = uri.split_once("://") {
            return Err(MigrateError::Config(format!(
                "Unsupported DB_URI scheme '{}' (expected 'file' or 'memory')",
                scheme
            )));
        }
        Ok(Self::File(PathBuf::from(uri)))
    }

    /// Open the backend this URI points at.
    pub fn open(&self) -> Box<dyn SchemaBackend> {
        match self {
            Self::Memory => Box::new(MemoryBackend::new()),
            Self::File(path) => Box::new(FileBackend::new(path)),
        }
    }
}

impl fmt::Display for DatabaseUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory://"),
            Self::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(MigrateError::Config(format!("Unknown LOG_LEVEL '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Plain,
    Json,
}

impl FromStr for LogFormat {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(MigrateError::Config(format!("Unknown LOG_FORMAT '{}'", other))),
        }
    }
}

/// Migration tool configuration
///
/// Built with chained setters or read from the environment:
///
/// | variable        | default                 |
/// |-----------------|-------------------------|
/// | `DB_URI`        | `file://db/5esheets.db` |
/// | `MIGRATE_TARGET`| `default`               |
/// | `SQL_ECHO`      | `false`                 |
/// | `LOG_LEVEL`     | `INFO`                  |
/// | `LOG_FORMAT`    | `plain`                 |
#[derive(Debug, Clone)]
pub struct MigrateConfig {
    /// Target database location
    pub database: DatabaseUri,

    /// Row name in the bookkeeping table
    pub target: String,

    /// Log each DDL statement
    pub echo: bool,

    pub log_level: LogLevel,

    pub log_format: LogFormat,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrateConfig {
    pub fn new() -> Self {
        Self {
            database: DatabaseUri::File(PathBuf::from(DEFAULT_DB_PATH)),
            target: DEFAULT_TARGET.to_string(),
            echo: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }

    /// Defaults with the database taken from `uri`.
    pub fn from_url(uri: &str) -> Result<Self> {
        Self::new().database_url(uri)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        if let Some(uri) = lookup("DB_URI") {
            config.database = DatabaseUri::parse(&uri)?;
        }
        if let Some(target) = lookup("MIGRATE_TARGET") {
            config = config.target(&target)?;
        }
        if let Some(echo) = lookup("SQL_ECHO") {
            config.echo = parse_bool("SQL_ECHO", &echo)?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level.parse()?;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = format.parse()?;
        }
        Ok(config)
    }

    /// Set the database from a URI
    pub fn database_url(mut self, uri: &str) -> Result<Self> {
        self.database = DatabaseUri::parse(uri)?;
        Ok(self)
    }

    /// Set the database to a file path
    pub fn database_path(mut self, path: impl AsRef<Path>) -> Self {
        self.database = DatabaseUri::File(path.as_ref().to_path_buf());
        self
    }

    pub fn target(mut self, target: &str) -> Result<Self> {
        let target = target.trim();
        if target.is_empty() {
            return Err(MigrateError::Config("Target name must not be empty".to_string()));
        }
        self.target = target.to_string();
        Ok(self)
    }

    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(MigrateError::Config(format!("{} must be a boolean, got '{}'", key, other))),
    }
}

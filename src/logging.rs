use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LogLevel};
use crate::core::{MigrateError, Result};

/// Install the global tracing subscriber. Logs go to stderr so command
/// output on stdout stays clean. `RUST_LOG`, when set, wins over `level`.
pub fn init(level: LogLevel, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Plain => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| MigrateError::Config(format!("Failed to initialise logging: {}", e)))
}

//! Logging initialization utilities.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::LogLevel;

/// Initialize logging with the specified level.
///
/// `RUST_LOG` takes precedence when set. Logs go to stderr so stdout only
/// carries matched objects.
pub fn init_logging(level: LogLevel) -> Result<()> {
    let level: Level = level.into();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}

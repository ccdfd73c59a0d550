use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "projpage=info";

/// Directory the rolling log files go to
pub fn log_dir() -> Result<PathBuf> {
  let base = dirs::cache_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".cache")))
    .ok_or_else(|| eyre!("Could not determine cache directory"))?;

  Ok(base.join("projpage"))
}

/// Route `tracing` output to a daily log file, since the terminal belongs to the UI.
///
/// Filtering follows `RUST_LOG`, defaulting to `projpage=info`. Keep the
/// returned guard alive until exit or buffered lines are lost.
pub fn init() -> Result<WorkerGuard> {
  let dir = log_dir()?;
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&dir, "projpage.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

/// Send tracing output to a log file; the terminal belongs to the TUI.
/// Appends to the file, creating it if needed.
pub fn init_file_logging(log_path: &Path, level: &str) -> Result<()> {
    let level: Level = level
        .parse()
        .with_context(|| format!("Invalid log level: {level}"))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(level)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    Ok(())
}

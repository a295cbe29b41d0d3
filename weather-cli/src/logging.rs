use anyhow::{Context, Result};
use std::{fs::OpenOptions, sync::Mutex};
use tracing_subscriber::EnvFilter;
use weather_core::Config;

const LOG_FILE: &str = "dashboard.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr, for one-shot commands.
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to a file in the data directory. The dashboard owns the terminal, so
/// anything written to stderr would land in the middle of the frame.
pub fn init_file() -> Result<()> {
    let dir = Config::data_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    tracing::info!(path = %path.display(), "dashboard logging initialized");
    Ok(())
}

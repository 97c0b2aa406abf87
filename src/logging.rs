use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::Local;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Log file name for a run started now, e.g. `bot_2024-01-31_18-02-59.log`
pub fn log_file_name() -> String {
    format!("bot_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S"))
}

/// Installs the global subscriber: console output plus a plain-text log file
///
/// Returns the path of the log file.
pub fn init(logs_dir: &Path, level: Level) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(logs_dir)?;
    let path = logs_dir.join(log_file_name());
    let file = File::create(&path)?;

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        .try_init()?;

    Ok(path)
}

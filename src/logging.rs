//! File-backed logging. The terminal belongs to the TUI, so log lines go to a
//! file in the data directory instead of stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Route the `log` facade into `path`. `RUST_LOG` wins over `default_level`.
pub fn init(path: &Path, default_level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    Builder::from_env(Env::default().default_filter_or(default_level))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init()
        .context("logger already initialized")?;

    Ok(())
}

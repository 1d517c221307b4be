use std::fs::{self, OpenOptions};
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing_subscriber::EnvFilter;

/// Logs go to a file; the terminal belongs to the UI.
pub fn init_tracing(output_path: &Path, default_level: &str) -> Result<()> {
    ensure_parent_dir(output_path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output_path)
        .wrap_err_with(|| format!("failed to open log file {}", output_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| eyre!("invalid log level `{default_level}`: {e}"))?;

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eyre!("failed to set tracing subscriber: {e}"))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

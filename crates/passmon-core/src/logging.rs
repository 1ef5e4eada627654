//! Logging init: non-blocking file writer under the XDG state dir, so log
//! lines never interleave with the stdout status line.

use anyhow::Result;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,passmon_core=debug,passmon_cli=debug"))
}

/// Initialize logging to `~/.local/state/passmon/passmon.log`. The returned
/// guard flushes buffered lines on drop; hold it for the life of the
/// process. On failure (state dir unwritable) the caller should fall back
/// to [`init_logging_stderr`].
pub fn init_logging() -> Result<WorkerGuard> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("passmon")?;
    let log_dir = xdg_dirs.get_state_home();
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("passmon.log");

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();

    tracing::info!("logging to {}", log_path.display());
    Ok(guard)
}

/// Stderr-only fallback, used when the log file cannot be opened.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

//! Subscriber setup for the binary.

use std::path::{Path, PathBuf};
use telepoll_core::config::{shellexpand, LoggingConfig};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// With a log file configured, the returned guard flushes the background
/// writer on drop and must be held until the process exits.
pub fn init(cfg: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.level.to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let Some(ref file) = cfg.file else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
        return Ok(None);
    };

    let (dir, name) = split_log_path(&shellexpand(file))?;
    std::fs::create_dir_all(&dir)?;
    let (writer, guard) = non_blocking(rolling::never(&dir, &name));
    builder
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
    Ok(Some(guard))
}

/// Directory and file name of a log path. A bare name lands in `.`.
fn split_log_path(path: &str) -> anyhow::Result<(PathBuf, PathBuf)> {
    let path = Path::new(path);
    let name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(name)))
}

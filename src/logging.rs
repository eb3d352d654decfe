//! Logging setup for rosterbot using tracing.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::Error;

/// Prefix of the daily rolling log files.
pub const LOG_FILE_PREFIX: &str = "rosterbot.log";

/// Initialize logging with file appender and console output.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init(dir: Option<&Path>) -> Result<(WorkerGuard, PathBuf)> {
    let log_dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => default_log_dir()?,
    };
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rosterbot=debug"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::info!("rosterbot logging initialized");
    tracing::info!("Log directory: {}", log_dir.display());

    Ok((guard, log_dir))
}

/// Default log directory under the platform data dir.
pub fn default_log_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "rosterbot", "rosterbot")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;

    Ok(dirs.data_dir().join("logs"))
}

/// Most recent log file in `dir`.
pub fn latest_log_file(dir: &Path) -> crate::error::Result<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(LOG_FILE_PREFIX))
                    .unwrap_or(false)
        })
        .collect();
    // Daily suffixes are ISO dates, so name order is age order.
    files.sort();
    files
        .pop()
        .ok_or_else(|| Error::NotFound(format!("no log file in {}", dir.display())))
}

/// Last `count` lines of the current log file.
pub fn tail(dir: &Path, count: usize) -> crate::error::Result<Vec<String>> {
    let path = latest_log_file(dir)?;
    let bytes = std::fs::read(&path)?;
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    Ok(lines[start..].iter().map(|l| l.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn tail_reads_newest_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("rosterbot.log.2024-01-01"), "old\n").unwrap();
        let body: String = (1..=60).map(|i| format!("line {}\n", i)).collect();
        std::fs::write(dir.path().join("rosterbot.log.2024-01-02"), body).unwrap();
        std::fs::write(dir.path().join("other.txt"), "ignored\n").unwrap();

        let lines = tail(dir.path(), 50).unwrap();
        assert_eq!(lines.len(), 50);
        assert_eq!(lines[0], "line 11");
        assert_eq!(lines[49], "line 60");
    }

    #[test]
    fn tail_of_short_file_returns_everything() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("rosterbot.log.2024-01-01"), "a\nb\n").unwrap();
        assert_eq!(tail(dir.path(), 50).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn missing_log_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(tail(dir.path(), 5), Err(Error::NotFound(_))));
    }
}

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use anyhow::Context;
use tokio::task;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Keeps the non-blocking file writer alive. Drop it last.
#[allow(dead_code)]
pub struct LoggerGuard(WorkerGuard);

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn normalize_level(level: &str) -> &str {
    if VALID_LEVELS.contains(&level) {
        level
    } else {
        eprintln!("Invalid log level '{}', defaulting to 'info'", level);
        "info"
    }
}

/// Console + daily rolling file logging. `RUST_LOG` overrides `level`.
///
/// Must be called from inside a tokio runtime (it spawns the log cleanup
/// task).
pub fn init_logging(
    log_dir: impl AsRef<Path>,
    prefix: &str,
    level: &str,
) -> anyhow::Result<LoggerGuard> {
    let log_dir = log_dir.as_ref().to_path_buf();

    let level: LevelFilter = normalize_level(level)
        .parse()
        .context("Failed to parse log level")?;
    let builder = EnvFilter::builder().with_default_directive(level.into());

    let rust_log = std::env::var("RUST_LOG").unwrap_or_default();
    let console_filter = builder.clone().parse_lossy(&rust_log);
    let file_filter = builder.parse_lossy(&rust_log);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(&log_dir)
        .with_context(|| format!("Failed to create log appender in {}", log_dir.display()))?;
    let (non_blocking, guard) = NonBlocking::new(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(file_filter);
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    start_log_cleanup_task(log_dir, prefix.to_string());

    Ok(LoggerGuard(guard))
}

fn start_log_cleanup_task(log_dir: PathBuf, prefix: String) {
    const MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 3);
    const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

    task::spawn(async move {
        loop {
            if let Err(e) = cleanup_old_logs(&log_dir, &prefix, MAX_AGE) {
                tracing::warn!("Failed to delete old log file: {}", e);
            }
            tokio::time::sleep(CLEANUP_INTERVAL).await;
        }
    });
}

fn cleanup_old_logs(log_dir: &Path, prefix: &str, max_age: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !(file_name.starts_with(prefix) && file_name.ends_with(".log")) {
            continue;
        }

        let modified = fs::metadata(&path)?.modified()?;
        if now.duration_since(modified).unwrap_or_default() > max_age {
            fs::remove_file(&path)?;
            tracing::info!("Old log file deleted: {}", file_name);
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("debug"), "debug");
        assert_eq!(normalize_level("verbose"), "info");
    }

    #[test]
    fn test_cleanup_removes_only_old_prefixed_logs() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let stale = dir.join("qth-resolver.2025-01-01.log");
        let fresh = dir.join("qth-resolver.2025-01-05.log");
        let foreign = dir.join("other.log");
        for path in [&stale, &fresh, &foreign] {
            fs::write(path, "x").unwrap();
        }

        let four_days_ago = SystemTime::now() - Duration::from_secs(60 * 60 * 24 * 4);
        for path in [&stale, &foreign] {
            fs::File::options()
                .write(true)
                .open(path)
                .unwrap()
                .set_modified(four_days_ago)
                .unwrap();
        }

        let max_age = Duration::from_secs(60 * 60 * 24 * 3);
        let removed = cleanup_old_logs(dir, "qth-resolver", max_age).unwrap();
        assert_eq!(removed, 1);
        assert!(!stale.exists());
        assert!(fresh.exists());
        assert!(foreign.exists());

        assert_eq!(cleanup_old_logs(dir, "qth-resolver", max_age).unwrap(), 0);
    }
}

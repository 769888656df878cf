use crate::config::{Config, LogRotation};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "fabao-debug.log";
const LOG_FILTER_ENV: &str = "FABAO_LOG";

/// Keeps the background log writer alive; drop it to flush.
pub struct LogGuard(#[allow(dead_code)] WorkerGuard);

/// Initialize file logging.
///
/// The terminal belongs to the TUI, so logs only go to a file, and only when
/// `debug` is enabled. Returns `None` when logging stays off.
pub fn init(config: &Config) -> Result<Option<LogGuard>> {
    if !config.debug {
        return Ok(None);
    }

    let rotation = config.debug_log_rotation.unwrap_or(LogRotation::Session);
    let base = resolve_log_path(config.debug_log_path.as_deref())?;
    let (writer, target, guard) = open_writer(&base, rotation, config.debug_log_keep)?;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_new("fabao=debug,warn"))
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok(); // Already initialized in tests.

    tracing::info!(log_file = %target.display(), rotation = ?rotation, "debug logging enabled");

    Ok(Some(LogGuard(guard)))
}

fn open_writer(
    base: &Path,
    rotation: LogRotation,
    keep: Option<usize>,
) -> Result<(NonBlocking, PathBuf, WorkerGuard)> {
    let (dir, base_name) = split_dir_and_name(base)?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    match rotation {
        LogRotation::Never => {
            let file = open_append(base)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, base.to_path_buf(), guard))
        }
        LogRotation::Daily => {
            // rolling::daily names files `{base_name}.{YYYY-MM-DD}`
            prune_rotated(&dir, &format!("{base_name}."), keep.unwrap_or(7))?;
            let appender = tracing_appender::rolling::daily(&dir, &base_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Ok((writer, base.to_path_buf(), guard))
        }
        LogRotation::Session => {
            prune_rotated(&dir, &format!("{base_name}.session-"), keep.unwrap_or(20))?;
            let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
            let path = dir.join(format!("{base_name}.session-{ts}"));
            let file = open_append(&path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, path, guard))
        }
    }
}

fn open_append(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

/// Resolve the configured log location to a file path.
///
/// A value ending in a separator, or naming an existing directory, gets the
/// default file name appended.
pub fn resolve_log_path(configured: Option<&str>) -> Result<PathBuf> {
    let Some(raw) = configured else {
        return Ok(crate::config::config_dir()?.join(LOG_FILE_NAME));
    };

    let path = PathBuf::from(expand_tilde(raw));
    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return Ok(path.join(LOG_FILE_NAME));
    }
    Ok(path)
}

fn expand_tilde(raw: &str) -> String {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.display(), &raw[1..]);
        }
    }
    raw.to_string()
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid debug_log_path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

/// Delete rotated files beyond the newest `keep`. `keep == 0` disables pruning.
fn prune_rotated(dir: &Path, prefix: &str, keep: usize) -> Result<()> {
    if keep == 0 {
        return Ok(());
    }

    let mut names: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(prefix))
        .collect();

    // Both suffix formats sort chronologically.
    names.sort_unstable_by(|a, b| b.cmp(a));

    for name in names.into_iter().skip(keep) {
        let path = dir.join(&name);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_values_get_default_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().to_str().unwrap();
        assert_eq!(resolve_log_path(Some(raw)).unwrap(), dir.path().join(LOG_FILE_NAME));
    }

    #[test]
    fn file_values_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.log");
        let resolved = resolve_log_path(Some(file.to_str().unwrap())).unwrap();
        assert_eq!(resolved, file);
    }

    #[test]
    fn prune_keeps_newest_sessions() {
        let dir = tempfile::tempdir().unwrap();
        for ts in ["20260101-000000", "20260102-000000", "20260103-000000"] {
            std::fs::write(dir.path().join(format!("{LOG_FILE_NAME}.session-{ts}")), "").unwrap();
        }
        std::fs::write(dir.path().join("unrelated.txt"), "").unwrap();

        prune_rotated(dir.path(), &format!("{LOG_FILE_NAME}.session-"), 2).unwrap();

        assert!(!dir
            .path()
            .join(format!("{LOG_FILE_NAME}.session-20260101-000000"))
            .exists());
        assert!(dir
            .path()
            .join(format!("{LOG_FILE_NAME}.session-20260103-000000"))
            .exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }
}

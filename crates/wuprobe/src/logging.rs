//! Log file setup
//!
//! stdout carries the single plugin output line, so all tracing output goes
//! to a size-capped file.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

/// `<path>.1`
fn rotated_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".1");
    PathBuf::from(name)
}

/// Move `path` aside if it has grown past `max_size` bytes.
/// Keeps one previous generation.
///
/// # Errors
/// Returns error if the old generation cannot be replaced
pub fn rotate_if_needed(path: &Path, max_size: u64) -> eyre::Result<bool> {
    let Ok(meta) = std::fs::metadata(path) else {
        return Ok(false);
    };
    if meta.len() <= max_size {
        return Ok(false);
    }

    let rotated = rotated_path(path);
    if rotated.exists() {
        std::fs::remove_file(&rotated)
            .wrap_err_with(|| format!("removing {}", rotated.display()))?;
    }
    std::fs::rename(path, &rotated).wrap_err_with(|| format!("rotating {}", path.display()))?;
    Ok(true)
}

/// Install the global subscriber writing to the configured log file
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
/// Returns error if the log file cannot be opened or a subscriber is
/// already installed
pub fn init(config: &LogConfig) -> eyre::Result<PathBuf> {
    let path = config.path();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("creating {}", parent.display()))?;
    }
    let rotated = rotate_if_needed(&path, config.max_size_bytes)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("opening log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file)
                .with_ansi(false),
        )
        .try_init()?;

    if rotated {
        tracing::info!(path = %path.display(), "log file rotated");
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_path() {
        assert_eq!(
            rotated_path(Path::new("/var/log/wuprobe.log")),
            PathBuf::from("/var/log/wuprobe.log.1")
        );
    }

    #[test]
    fn test_small_file_not_rotated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wuprobe.log");
        std::fs::write(&path, "short").unwrap();

        assert!(!rotate_if_needed(&path, 1024).unwrap());
        assert!(path.exists());
    }

    #[test]
    fn test_missing_file_not_rotated() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!rotate_if_needed(&dir.path().join("none.log"), 0).unwrap());
    }

    #[test]
    fn test_large_file_rotated_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wuprobe.log");
        let rotated = rotated_path(&path);
        std::fs::write(&rotated, "older generation").unwrap();
        std::fs::write(&path, "x".repeat(2048)).unwrap();

        assert!(rotate_if_needed(&path, 1024).unwrap());

        assert!(!path.exists());
        assert_eq!(std::fs::read_to_string(&rotated).unwrap().len(), 2048);
    }
}

//! Shared logging utilities for the conformance binaries.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "gpkg_check=info,gpkg_conformance=info";
const HOME_ENV: &str = "GPKG_CHECK_HOME";
const HOME_DIR_NAME: &str = ".gpkg_check";

/// Logging configuration shared by the binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    /// Overrides `<home>/logs`.
    pub log_dir: Option<PathBuf>,
}

/// Initialize tracing with a daily rolling file writer and stderr output.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process. If the log directory cannot be created, logging
/// continues on stderr only.
pub fn init_logging(config: LogConfig<'_>) -> Option<WorkerGuard> {
    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    let log_dir = match config.log_dir {
        Some(dir) => Ok(dir),
        None => logs_dir(),
    };

    let mut guard = None;
    let file_layer = match log_dir.and_then(|dir| ensure_dir(&dir)) {
        Ok(dir) => {
            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", config.app_name));
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(worker_guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(file_filter),
            )
        }
        Err(err) => {
            eprintln!("Warning: file logging disabled: {:#}", err);
            None
        }
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    guard
}

/// Home directory: `$GPKG_CHECK_HOME`, else `~/.gpkg_check`.
pub fn gpkg_check_home() -> Result<PathBuf> {
    resolve_home(std::env::var_os(HOME_ENV), dirs::home_dir())
}

/// Logs directory: `<home>/logs`.
pub fn logs_dir() -> Result<PathBuf> {
    Ok(gpkg_check_home()?.join("logs"))
}

fn resolve_home(override_path: Option<OsString>, user_home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    user_home
        .map(|home| home.join(HOME_DIR_NAME))
        .context("Could not determine home directory; set GPKG_CHECK_HOME")
}

fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    Ok(dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_user_home() {
        let home = resolve_home(Some("/opt/gpkg".into()), Some(PathBuf::from("/home/me"))).unwrap();
        assert_eq!(home, PathBuf::from("/opt/gpkg"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let home = resolve_home(Some(OsString::new()), Some(PathBuf::from("/home/me"))).unwrap();
        assert_eq!(home, PathBuf::from("/home/me/.gpkg_check"));
    }

    #[test]
    fn missing_home_is_an_error() {
        assert!(resolve_home(None, None).is_err());
    }

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("logs");
        assert_eq!(ensure_dir(&nested).unwrap(), nested);
        assert!(nested.is_dir());
    }
}

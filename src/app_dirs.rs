//! Where the service keeps its config file and logs.
//!
//! Everything lives in one `.overrun` folder under the OS config directory
//! (e.g., `%APPDATA%` on Windows). Containers and CI point it elsewhere with
//! `OVERRUN_CONFIG_HOME`.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory that lives under the config base.
pub const APP_DIR_NAME: &str = ".overrun";

/// Environment variable that replaces the OS config base.
pub const CONFIG_HOME_ENV: &str = "OVERRUN_CONFIG_HOME";

const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Return the `.overrun` directory, creating it if needed.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = config_base_dir().ok_or(AppDirError::NoBaseDir)?;
    root_dir_under(&base)
}

/// Return the logs directory inside the `.overrun` root, creating it if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    logs_dir_under(&app_root_dir()?)
}

fn root_dir_under(base: &Path) -> Result<PathBuf, AppDirError> {
    ensure_dir(base.join(APP_DIR_NAME))
}

fn logs_dir_under(root: &Path) -> Result<PathBuf, AppDirError> {
    ensure_dir(root.join(LOGS_DIR_NAME))
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}

fn config_base_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_HOME_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn root_and_logs_are_created_under_base() {
        let base = tempdir().unwrap();
        let root = root_dir_under(base.path()).unwrap();
        assert_eq!(root, base.path().join(APP_DIR_NAME));
        assert!(root.is_dir());
        let logs = logs_dir_under(&root).unwrap();
        assert_eq!(logs, root.join("logs"));
        assert!(logs.is_dir());
    }

    #[test]
    fn file_in_the_way_is_reported() {
        let base = tempdir().unwrap();
        std::fs::write(base.path().join(APP_DIR_NAME), "not a dir").unwrap();
        match root_dir_under(base.path()) {
            Err(AppDirError::CreateDir { path, .. }) => {
                assert_eq!(path, base.path().join(APP_DIR_NAME))
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

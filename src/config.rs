//! Service configuration stored as TOML.
//!
//! The file is optional. Without one the service binds to localhost:8000,
//! allows any CORS origin and reads artifacts from `./models`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs::{self, AppDirError};

/// Config file looked up in the app directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "overrun.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    AppDir(#[from] AppDirError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid bind address '{bind}': {source}")]
    InvalidBind {
        bind: String,
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub artifacts: ArtifactSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address the HTTP listener binds to.
    pub bind: String,
    /// Allow any origin, method and header.
    pub cors: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            cors: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    /// Directory holding the trained models, encoder and feature list.
    pub dir: PathBuf,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
        }
    }
}

impl ServiceConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|source| ConfigError::InvalidBind {
                bind: self.server.bind.clone(),
                source,
            })
    }
}

/// Default config location inside the app directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load from `explicit` if given, else from [`config_path`].
///
/// An explicit path must exist; a missing default file yields defaults.
pub fn load(explicit: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    match explicit {
        Some(path) => load_from(path),
        None => load_or_default(&config_path()?),
    }
}

fn load_or_default(path: &Path) -> Result<ServiceConfig, ConfigError> {
    if path.exists() {
        load_from(path)
    } else {
        Ok(ServiceConfig::default())
    }
}

pub fn load_from(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ServiceConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    config.bind_addr()?;
    Ok(config)
}

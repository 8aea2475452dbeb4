use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

pub const CONFIG_FILE: &str = "todo.toml";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// The data directory: the `-C` override if given, else the current directory
pub fn resolve_data_dir(dir: Option<&str>) -> Result<PathBuf, ConfigError> {
    let (path, result) = match dir {
        Some(d) => (PathBuf::from(d), fs::canonicalize(d)),
        None => (PathBuf::from("."), std::env::current_dir()),
    };
    result.map_err(|e| ConfigError::ReadError { path, source: e })
}

/// Read todo.toml from the data directory. A missing file yields defaults.
pub fn read_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError { path, source: e })
}

/// Full path of the task database for this data directory
pub fn store_path(data_dir: &Path, config: &AppConfig) -> PathBuf {
    data_dir.join(&config.store.file)
}

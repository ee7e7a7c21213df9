use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

const APP_DIR: &str = "sift";

/// Error type for locating directories and reading config.toml
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHomeDir,
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

/// Resolve an XDG base directory: the env var if set and absolute, else
/// `~/<fallback>`.
fn xdg_dir(var: &str, fallback: &str) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env::var_os(var).map(PathBuf::from)
        && dir.is_absolute()
    {
        return Ok(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(fallback))
        .ok_or(ConfigError::NoHomeDir)
}

/// `$XDG_CONFIG_HOME/sift` or `~/.config/sift`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    Ok(xdg_dir("XDG_CONFIG_HOME", ".config")?.join(APP_DIR))
}

/// `$XDG_STATE_HOME/sift` or `~/.local/state/sift`
pub fn default_state_dir() -> Result<PathBuf, ConfigError> {
    Ok(xdg_dir("XDG_STATE_HOME", ".local/state")?.join(APP_DIR))
}

/// `$XDG_CACHE_HOME/sift` or `~/.cache/sift`, home of the log file
pub fn cache_dir() -> Result<PathBuf, ConfigError> {
    Ok(xdg_dir("XDG_CACHE_HOME", ".cache")?.join(APP_DIR))
}

/// Read config.toml from the given directory. A missing file is the default
/// config; an unreadable or malformed one is an error.
pub fn read_config(config_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_dir.join("config.toml");
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(ConfigError::ReadError { path, source: e }),
    };
    toml::from_str(&text).map_err(|e| ConfigError::ParseError { path, source: e })
}

/// Where relationships.json lives: the config override or the XDG default
pub fn state_dir(config: &Config) -> Result<PathBuf, ConfigError> {
    match &config.state_dir {
        Some(dir) => Ok(dir.clone()),
        None => default_state_dir(),
    }
}

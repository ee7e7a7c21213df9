use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration from config.toml. Every field is optional; CLI flags win
/// over anything set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between task source refreshes
    #[serde(default)]
    pub refresh_interval: Option<u64>,
    /// Override for the directory that holds relationships.json
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// argv of a command that prints the task list as JSON.
    /// Empty = the built-in Things 3 script.
    #[serde(default)]
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Hex color overrides keyed by theme slot name
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

/// Default: 3 seconds, as documented in --help
pub const DEFAULT_REFRESH_SECS: u64 = 3;

impl Config {
    /// Resolve the refresh interval: flag, then config file, then default.
    /// Zero is bumped to one second.
    pub fn refresh_interval(&self, flag: Option<u64>) -> u64 {
        flag.or(self.refresh_interval)
            .unwrap_or(DEFAULT_REFRESH_SECS)
            .max(1)
    }
}

//! Configuration loaded from a JSON file, with every field optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths;

/// Command run when the config names no agent.
pub const DEFAULT_AGENT_COMMAND: &str = "colloquy-agent";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    HomeDir(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColloquyConfig {
    /// Root for stored threads. Defaults to `$HOME/.config/colloquy`.
    pub data_dir: Option<PathBuf>,

    /// Agent command line, split shell-style.
    pub agent_command: Option<String>,

    /// Kill the agent after this many seconds without output.
    pub agent_idle_timeout_secs: Option<u64>,

    /// Where per-thread agent I/O logs go. No logs when unset.
    pub log_dir: Option<PathBuf>,
}

impl ColloquyConfig {
    /// The data directory, falling back to the per-user default.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::default_data_dir().map_err(ConfigError::HomeDir),
        }
    }

    pub fn threads_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join("threads"))
    }

    pub fn agent_command(&self) -> &str {
        self.agent_command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_AGENT_COMMAND)
    }

    pub fn agent_idle_timeout(&self) -> Option<Duration> {
        self.agent_idle_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Load the config at `path`. A missing file means all defaults.
pub fn load_config(path: &Path) -> Result<ColloquyConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(ColloquyConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

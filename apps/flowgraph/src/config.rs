//! # Configuration
//!
//! Optional TOML file read at startup. Command-line flags override it.
//!
//! ```toml
//! [graph]
//! name = "main"
//! case_sensitive = false
//!
//! [log]
//! format = "json"           # or "text"
//! filter = "flowgraph=debug"
//! ```

use crate::error::AppError;
use flowgraph_core::GraphOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "flowgraph.toml";

/// Default log filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "flowgraph=info,flowgraph_core=info";

/// Settings for the graph created by a replay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub name: String,
    pub case_sensitive: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            name: flowgraph_core::primitives::DEFAULT_GRAPH_NAME.to_string(),
            case_sensitive: false,
        }
    }
}

impl GraphConfig {
    /// Options to create the graph with.
    #[must_use]
    pub fn options(&self) -> GraphOptions {
        GraphOptions {
            case_sensitive: self.case_sensitive,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub filter: Option<String>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub graph: GraphConfig,
    pub log: LogConfig,
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(text)?)
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, `flowgraph.toml` in the
    /// working directory is used if present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let path: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .map_err(|e| AppError::Io(format!("Cannot read config '{}': {}", path.display(), e)))?;
        Self::from_toml(&text)
    }
}

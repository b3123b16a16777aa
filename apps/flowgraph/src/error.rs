//! # Application Errors

use flowgraph_core::GraphError;
use thiserror::Error;

/// Errors surfaced by the `flowgraph` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// A script line could not be parsed.
    #[error("Invalid script at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A script operation hit an invalid graph state.
    #[error("Line {line}: {source}")]
    Graph {
        line: usize,
        #[source]
        source: GraphError,
    },

    /// The script ended with an explicit transaction still open.
    #[error("Script ended inside open transaction '{id}'")]
    UnterminatedTransaction { id: String },

    /// The configuration file is malformed.
    #[error("Invalid config: {0}")]
    Config(String),

    /// An input file exceeds the size limit.
    #[error("File size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

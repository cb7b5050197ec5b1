use std::io;

/// Errors that can occur during mpi-runner operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No active file: save the file before building or running it")]
    NoActiveFile,

    #[error("Unknown {catalog} method: {name}")]
    UnknownMethod { catalog: &'static str, name: String },

    #[error("Invalid process count: {0:?} is not an integer")]
    InvalidProcessCount(String),

    #[error("Method '{0}' is multi-process and needs a process count")]
    MissingProcessCount(String),

    #[error("Template mismatch for '{method}': template has {placeholders} placeholders, {values} values supplied")]
    TemplateMismatch {
        method: String,
        placeholders: usize,
        values: usize,
    },

    #[error("Tool not found while running: {0}")]
    ToolNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Hand-off error: {0}")]
    HandoffError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for mpi-runner operations
pub type Result<T> = std::result::Result<T, Error>;

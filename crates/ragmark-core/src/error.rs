//! Error types for ragmark

use thiserror::Error;

/// Result type alias using RagmarkError
pub type Result<T> = std::result::Result<T, RagmarkError>;

/// Error type alias for convenience
pub type Error = RagmarkError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const MODEL_UNREACHABLE: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for ragmark
#[derive(Debug, Error)]
pub enum RagmarkError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Model {model} is not reachable: {reason}")]
    ModelUnreachable { model: String, reason: String },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Generate error: {0}")]
    Generate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RagmarkError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ModelUnreachable { .. } => exit_codes::MODEL_UNREACHABLE,
            Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

//! Domain-specific error types for coach-engine

use thiserror::Error;

/// Main error type for the coaching engine
///
/// Parse ambiguity and missing template matches are deliberately absent:
/// the pipeline resolves both locally (unset field, built-in default).
#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid knowledge base import: {message}")]
    InvalidImport { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Generation failure: {message}")]
    GenerationFailure { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Remote generator error: {message}")]
    Remote { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoachError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        CoachError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid_import(message: impl Into<String>) -> Self {
        CoachError::InvalidImport {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        CoachError::GenerationFailure {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for CoachError {
    fn from(err: anyhow::Error) -> Self {
        CoachError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoachError {
    fn from(err: serde_json::Error) -> Self {
        CoachError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CoachError {
    fn from(err: toml::de::Error) -> Self {
        CoachError::Config {
            message: format!("TOML parse error: {}", err),
        }
    }
}

impl From<std::io::Error> for CoachError {
    fn from(err: std::io::Error) -> Self {
        CoachError::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

/// Result type alias for coach-engine operations
pub type Result<T> = std::result::Result<T, CoachError>;

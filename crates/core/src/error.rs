//! Error types for medquery.
//!
//! This module defines a unified error enum covering the failure taxonomy of
//! both pipelines: document loading, embedding, vector index access, and
//! answer generation, plus the ambient configuration and serialization
//! failures.

use thiserror::Error;

/// Unified error type for medquery.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A corpus document could not be read or parsed
    #[error("Load error: {0}")]
    Load(String),

    /// The embedding capability is unreachable or returned malformed output
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Upsert or query failure against the vector index
    #[error("Index error: {0}")]
    Index(String),

    /// The generative capability is unreachable, timed out, or returned
    /// empty output
    #[error("Generation error: {0}")]
    Generation(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

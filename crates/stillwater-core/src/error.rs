//! Core error types for stillwater-core.
//!
//! Aggregation code never fails on empty input; these errors cover the
//! collaborators around it (storage, configuration, the chat endpoint) and
//! argument validation at the API boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for stillwater-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Chat completion errors
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Credential store errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored value could not be decoded
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home/config directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Chat completion errors.
///
/// Callers of [`crate::chat::ChatCompanion`] never see these; the companion
/// substitutes a fallback reply. They surface only from the raw client.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Network/transport failure
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Chat endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not contain an assistant message
    #[error("Malformed chat response: {0}")]
    MalformedResponse(String),

    /// No API key available
    #[error("Chat client not configured: {0}")]
    NotConfigured(String),

    /// Base URL could not be joined with the completions path
    #[error("Invalid chat endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

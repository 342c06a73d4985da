//! Error types for Noticeboard Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No tier in the chain accepted the operation
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A value could not be encoded for storage
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored bytes could not be decoded back to the expected shape
    #[error("Failed to decode value for '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

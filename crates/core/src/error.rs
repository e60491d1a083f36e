//! Error types for verstamp core

use thiserror::Error;

/// Version tree error types
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid timestamp for {field}: {value:?} ({source})")]
    InvalidTimestamp {
        field: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Environment variable {name} is not valid unicode")]
    NotUnicode { name: String },
}

/// Result type for verstamp core operations
pub type Result<T> = std::result::Result<T, VersionError>;

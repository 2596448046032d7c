//! Error types for the core library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend request failed.
    #[error(transparent)]
    Remote(#[from] mailpilot_remote::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No backend URL is configured.
    #[error("GAS URL is not configured")]
    NotConfigured,

    /// Attachment exceeds the size the backend can send.
    #[error("{} is {size} bytes, over the {limit} byte attachment limit", path.display())]
    AttachmentTooLarge {
        /// File that was rejected.
        path: PathBuf,
        /// Its size in bytes.
        size: u64,
        /// The limit it exceeds.
        limit: u64,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

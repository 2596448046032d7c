//! Error types for backend requests.

/// Result type alias for backend requests.
pub type Result<T> = std::result::Result<T, Error>;

/// Backend request error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network, timeout or connection failure (also covers redirect-cap overflow).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a status other than 200.
    #[error("HTTP status {status}, body: {body}")]
    Status {
        /// Status code returned by the backend.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// A POST was redirected without a `Location` header.
    #[error("redirect target unknown")]
    MissingRedirectTarget,

    /// The request URL could not be built.
    #[error("URL error: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend returned a well-formed response carrying an error message.
    #[error("backend error: {0}")]
    Backend(String),

    /// Every attempt failed; `source` is the error of the last attempt.
    #[error("retry limit exceeded after {attempts} attempts: {source}")]
    RetryLimitExceeded {
        /// Number of attempts made.
        attempts: u32,
        /// Error observed on the final attempt.
        source: Box<Error>,
    },
}

impl Error {
    /// Returns true if another attempt may succeed.
    ///
    /// Backend errors are definitive and JSON errors are deterministic, so
    /// neither is retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { .. } | Self::MissingRedirectTarget | Self::InvalidUrl(_)
        )
    }

    /// Returns the error of the final attempt when retries were exhausted,
    /// otherwise the error itself.
    #[must_use]
    pub fn last_attempt(&self) -> &Self {
        match self {
            Self::RetryLimitExceeded { source, .. } => source,
            other => other,
        }
    }

    /// Returns the backend-supplied message, if this is a backend error.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Backend(message) => Some(message),
            _ => None,
        }
    }
}

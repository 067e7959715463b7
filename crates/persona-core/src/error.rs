//! Error types for persona-core
//!
//! Failures of a recommendation turn are classified here so the front-end can
//! pick the matching localized message. We use `thiserror` for the Display
//! and Error implementations.

use thiserror::Error;

/// Result type alias for persona-core operations
pub type Result<T> = std::result::Result<T, RecommendError>;

/// Main error type
#[derive(Error, Debug)]
pub enum RecommendError {
    /// The endpoint answered with a status other than 200
    #[error("server returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: u16,
        /// `detail` field of a JSON error body, when present
        detail: Option<String>,
        /// Raw response body
        body: String,
    },

    /// HTTP 200 but the body is not a recommendation result
    #[error("invalid response body: {0}")]
    InvalidBody(String),

    /// The endpoint could not be reached at all
    #[error("failed to connect to {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// Any other transport failure
    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`RecommendError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Status,
    InvalidBody,
    Connection,
    Timeout,
    Request,
    Config,
    Io,
}

impl RecommendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Status { .. } => ErrorKind::Status,
            Self::InvalidBody(_) => ErrorKind::InvalidBody,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Request(_) => ErrorKind::Request,
            Self::InvalidConfig(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Build a status error from a raw response body.
    ///
    /// FastAPI-style servers put the message in `detail`; it may be a string
    /// or an arbitrary JSON value (validation errors come back as a list).
    pub fn from_status(status: u16, body: String) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("detail").cloned())
            .map(|detail| match detail {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            });

        Self::Status {
            status,
            detail,
            body,
        }
    }
}

impl From<toml::de::Error> for RecommendError {
    fn from(e: toml::de::Error) -> Self {
        RecommendError::InvalidConfig(e.to_string())
    }
}

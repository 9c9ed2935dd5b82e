//! Crate-level error types.
//!
//! [`PaydeskError`] unifies every error source (configuration, outbound
//! HTTP, JSON, upstream replies) behind a single enum so callers can match
//! on the variant they care about while still using the `?` operator.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PaydeskError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum PaydeskError {
    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// An outbound HTTP call failed at the transport level.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A caller supplied input that is rejected before any request is made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The upstream answered with a non-success status.
    #[error("upstream returned status {status}")]
    Upstream { status: u16, details: Option<String> },

    /// The upstream answered with a body that is not the expected JSON.
    #[error("malformed upstream response: {0}")]
    UpstreamFormat(String),

    /// A background request task ended without producing a reply.
    #[error("request task failed: {0}")]
    Task(String),

    /// Socket or filesystem failure.
    #[error("io error: {0}")]
    Io(String),
}

impl PaydeskError {
    /// Short text for an inline banner. Transport errors leave out the
    /// request URL.
    pub fn user_message(&self) -> String {
        match self {
            Self::Upstream {
                details: Some(details),
                ..
            } => details.clone(),
            Self::Upstream {
                status,
                details: None,
            } => format!("request failed with status {status}"),
            Self::Http(e) if e.is_timeout() => "request timed out".to_string(),
            Self::Http(_) => "could not reach the server".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for PaydeskError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

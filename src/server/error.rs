use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

/// Error body returned by every proxy route: `{"error": ..., "details"?: ...}`.
#[derive(Debug, Serialize)]
pub struct ProxyError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ProxyError {
    /// Input rejected before anything is forwarded.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: message.into(),
            details: None,
        }
    }

    /// Transport, configuration or upstream failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: message.into(),
            details: None,
        }
    }

    /// The provider answered with something that is not JSON.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            error: message.into(),
            details: None,
        }
    }

    /// An upstream failure reported with the upstream's own status.
    pub fn upstream(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Option<Value>) -> Self {
        self.details = details;
        self
    }
}

/// Checks an id taken from the path or query string. Blank ids count as
/// missing; ids that would not survive as one upstream path segment are
/// rejected.
pub fn require_id<'a>(raw: &'a str, kind: &str) -> Result<&'a str, ProxyError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ProxyError::bad_request(format!("{kind} ID is required")));
    }
    if !crate::provider::is_segment_safe(id) {
        return Err(ProxyError::bad_request(format!("Invalid {kind} ID")));
    }
    Ok(id)
}

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_trimmed() {
        assert_eq!(require_id("  p1 ", "Payout").unwrap(), "p1");
    }

    #[test]
    fn blank_ids_are_missing() {
        let err = require_id(" \t", "Payout").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error, "Payout ID is required");
    }

    #[test]
    fn dot_segments_are_invalid() {
        for id in [".", "..", " .. "] {
            let err = require_id(id, "Account").unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.error, "Invalid Account ID");
        }
    }
}

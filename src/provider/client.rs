//! Outbound HTTP client for the payments provider.
//!
//! Every proxy route performs exactly one [`ProviderClient::send`]. No
//! retries, no caching; the transport's default timeouts apply.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use super::Operation;
use crate::Result;
use crate::config::ProviderConfig;

/// Upper bound on how much of a non-JSON error body is echoed back.
const MAX_DETAIL_LEN: usize = 512;

/// Status and raw body of an upstream reply.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PaydeskError::UpstreamFormat`](crate::PaydeskError::UpstreamFormat)
    /// if the body is not valid JSON.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).map_err(|e| {
            crate::PaydeskError::UpstreamFormat(format!(
                "{} body from provider is not JSON: {e}",
                self.status
            ))
        })
    }

    /// Best-effort description of an upstream failure.
    ///
    /// Prefers a JSON `message` or `error` string, then the whole JSON body,
    /// then the raw text truncated to a bounded length.
    pub fn details(&self) -> Option<Value> {
        if let Ok(value) = serde_json::from_slice::<Value>(&self.body) {
            for key in ["message", "error"] {
                if let Some(text) = value.get(key).and_then(Value::as_str) {
                    return Some(Value::String(text.to_string()));
                }
            }
            return Some(value);
        }

        let text = String::from_utf8_lossy(&self.body);
        let text = text.trim();
        if text.is_empty() {
            return self
                .status
                .canonical_reason()
                .map(|reason| Value::String(reason.to_string()));
        }
        let cut = text
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= MAX_DETAIL_LEN)
            .last()
            .unwrap_or(0);
        let truncated = if text.len() > MAX_DETAIL_LEN { &text[..cut] } else { text };
        Some(Value::String(truncated.to_string()))
    }

    /// Converts a non-success reply into [`PaydeskError::Upstream`](crate::PaydeskError::Upstream).
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(crate::PaydeskError::Upstream {
            status: self.status.as_u16(),
            details: self.details().map(|d| match d {
                Value::String(s) => s,
                other => other.to_string(),
            }),
        })
    }
}

/// Shared, cheaply cloneable handle to the provider.
#[derive(Clone, Debug)]
pub struct ProviderClient {
    http: reqwest::Client,
    config: Arc<ProviderConfig>,
}

impl ProviderClient {
    /// Creates a client over `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PaydeskError::Http`](crate::PaydeskError::Http) if the TLS
    /// backend cannot be initialised.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("paydesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Issues `op` with an optional JSON body and returns the raw reply.
    ///
    /// Non-success statuses are returned as-is; only transport failures and
    /// configuration problems are errors.
    ///
    /// # Errors
    ///
    /// Returns [`PaydeskError::Config`](crate::PaydeskError::Config) if the
    /// request cannot be built, or [`PaydeskError::Http`](crate::PaydeskError::Http)
    /// if the call fails in transit.
    pub async fn send(&self, op: Operation<'_>, body: Option<&Value>) -> Result<UpstreamResponse> {
        let request = self.config.request(&op)?;
        debug!(op = %op, method = %request.method, url = %request.url, "forwarding to provider");

        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.inspect_err(|e| {
            warn!(op = %op, error = %e, "provider call failed");
        })?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            debug!(op = %op, status = status.as_u16(), "provider replied");
        } else {
            warn!(op = %op, status = status.as_u16(), "provider replied with error status");
        }

        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn reply(status: u16, body: &str) -> UpstreamResponse {
        UpstreamResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn details_prefer_message_field() {
        let details = reply(400, r#"{"message":"bad routing number","code":"E1"}"#).details();
        assert_eq!(details, Some(json!("bad routing number")));
    }

    #[test]
    fn details_fall_back_to_whole_json() {
        let details = reply(400, r#"{"code":"E1"}"#).details();
        assert_eq!(details, Some(json!({"code": "E1"})));
    }

    #[test]
    fn details_truncate_plain_text() {
        let long = "x".repeat(2 * MAX_DETAIL_LEN);
        let details = reply(500, &long).details().unwrap();
        assert!(details.as_str().unwrap().len() <= MAX_DETAIL_LEN);
    }

    #[test]
    fn empty_body_uses_reason_phrase() {
        assert_eq!(reply(503, "").details(), Some(json!("Service Unavailable")));
    }

    #[test]
    fn non_json_body_is_a_format_error() {
        let err = reply(200, "<html>").json().unwrap_err();
        assert!(matches!(err, crate::PaydeskError::UpstreamFormat(_)));
    }

    #[test]
    fn error_for_status_keeps_details() {
        let err = reply(422, r#"{"error":"invalid"}"#).error_for_status().unwrap_err();
        match err {
            crate::PaydeskError::Upstream { status, details } => {
                assert_eq!(status, 422);
                assert_eq!(details.as_deref(), Some("invalid"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

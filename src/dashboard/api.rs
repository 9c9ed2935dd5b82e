//! The dashboard's view of the proxy routes.
//!
//! Controllers talk to a [`DashboardApi`]; [`HttpDashboardApi`] is the
//! implementation that calls the proxy's own HTTP surface.

use std::future::Future;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::provider::is_segment_safe;
use crate::{PaydeskError, Result};
use crate::models::{Account, CreatePayoutRequest, PayoutBatch};

/// One method per proxy call a page can trigger.
pub trait DashboardApi: Send + Sync + 'static {
    fn list_accounts(&self) -> impl Future<Output = Result<Vec<Account>>> + Send;

    fn create_account(&self, name: String) -> impl Future<Output = Result<Value>> + Send;

    fn search_payouts(&self) -> impl Future<Output = Result<Vec<PayoutBatch>>> + Send;

    fn create_payout(
        &self,
        request: CreatePayoutRequest,
    ) -> impl Future<Output = Result<Value>> + Send;

    fn execute_payout(&self, id: String) -> impl Future<Output = Result<Value>> + Send;
}

/// [`DashboardApi`] over HTTP against a running proxy.
///
/// Any non-2xx reply is an error, like a browser `fetch` checked with
/// `response.ok`.
#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpDashboardApi {
    /// # Errors
    ///
    /// Returns [`PaydeskError::Config`](crate::PaydeskError::Config) if
    /// `base_url` is not an absolute URL, or
    /// [`PaydeskError::Http`](crate::PaydeskError::Http) if the client
    /// cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| crate::PaydeskError::Config(format!("invalid proxy URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(crate::PaydeskError::Config(format!(
                "proxy URL cannot carry a path: {base_url}"
            )));
        }
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Reads a reply body as JSON.
///
/// A non-2xx reply becomes [`PaydeskError::Upstream`] carrying the proxy's
/// own `{error, details}` text. A body that is not valid JSON surfaces as
/// [`PaydeskError::Json`], not as a transport error.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(PaydeskError::Upstream {
            status: status.as_u16(),
            details: error_text(&body),
        });
    }
    Ok(serde_json::from_slice(&body)?)
}

/// Picks the most specific message out of a proxy error body: `details`
/// when present, else `error`.
fn error_text(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let pick = |key: &str| match value.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    };
    pick("details").or_else(|| pick("error"))
}

/// Converts each list element on its own, skipping the ones that do not fit
/// `T`. One odd record never hides the rest of the list.
pub fn lenient_list<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            serde_json::from_value(item)
                .inspect_err(|e| warn!(what, index, error = %e, "skipping unreadable record"))
                .ok()
        })
        .collect()
}

impl DashboardApi for HttpDashboardApi {
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let response = self.http.get(self.endpoint(&["accounts-proxy"])).send().await?;
        let items: Vec<Value> = read_json(response).await?;
        Ok(lenient_list(items, "account"))
    }

    async fn create_account(&self, name: String) -> Result<Value> {
        let response = self
            .http
            .post(self.endpoint(&["accounts-proxy"]))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        read_json(response).await
    }

    async fn search_payouts(&self) -> Result<Vec<PayoutBatch>> {
        let response = self
            .http
            .post(self.endpoint(&["payouts-search-proxy"]))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let items: Vec<Value> = read_json(response).await?;
        let batches: Vec<PayoutBatch> = lenient_list(items, "payout batch");
        debug!(count = batches.len(), "payout history received");
        Ok(batches)
    }

    async fn create_payout(&self, request: CreatePayoutRequest) -> Result<Value> {
        let response = self
            .http
            .post(self.endpoint(&["payouts-proxy"]))
            .json(&request)
            .send()
            .await?;
        read_json(response).await
    }

    async fn execute_payout(&self, id: String) -> Result<Value> {
        let id = id.trim();
        if !is_segment_safe(id) {
            return Err(PaydeskError::InvalidInput(format!("'{id}' is not a valid payout id")));
        }
        let response = self
            .http
            .post(self.endpoint(&["payouts-execute-proxy", id]))
            .send()
            .await?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn endpoint_escapes_ids() {
        let api = HttpDashboardApi::new("http://127.0.0.1:3000/").unwrap();
        let url = api.endpoint(&["payouts-execute-proxy", "a/b c"]);
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/payouts-execute-proxy/a%2Fb%20c");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let api = HttpDashboardApi::new("http://localhost/dash").unwrap();
        let url = api.endpoint(&["accounts-proxy"]);
        assert_eq!(url.as_str(), "http://localhost/dash/accounts-proxy");
    }

    #[tokio::test]
    async fn unusable_execute_ids_are_rejected_before_sending() {
        let api = HttpDashboardApi::new("http://127.0.0.1:1").unwrap();
        for id in ["  ", "..", "."] {
            let err = api.execute_payout(id.into()).await.unwrap_err();
            assert!(matches!(err, PaydeskError::InvalidInput(_)), "id {id:?}");
        }
    }

    #[test]
    fn error_text_prefers_details() {
        let body = br#"{"error":"Failed to execute payout","details":"already executed"}"#;
        assert_eq!(error_text(body).as_deref(), Some("already executed"));

        let body = br#"{"error":"Payout ID is required"}"#;
        assert_eq!(error_text(body).as_deref(), Some("Payout ID is required"));

        assert_eq!(error_text(b"<html>").as_deref(), None);
    }

    #[test]
    fn lenient_list_skips_bad_records() {
        let items = vec![
            json!({"id": "a1", "name": "Ops", "status": "ACTIVE"}),
            json!({"id": "a2", "name": null, "status": "PENDING"}),
            json!("garbage"),
            json!({"id": "a3", "name": "Payroll", "status": "PENDING"}),
        ];
        let accounts: Vec<Account> = lenient_list(items, "account");
        let ids: Vec<_> = accounts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a3"]);
    }
}

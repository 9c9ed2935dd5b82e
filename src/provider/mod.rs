//! Upstream payments provider: endpoint templates and header construction.
//!
//! [`ProviderConfig::request`] is a pure mapping from an [`Operation`] to
//! the method, fully qualified URL and header set of the outbound call.
//! The [`client`] module performs the call.

pub mod client;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};

pub use client::{ProviderClient, UpstreamResponse};

use crate::config::ProviderConfig;

/// Organization scoping header.
pub const ON_BEHALF_OF: HeaderName = HeaderName::from_static("on-behalf-of");

/// Narrowly scoped credential required only for payout execution.
pub const TRANSFER_API_KEY: HeaderName = HeaderName::from_static("transfer-api-key");

/// An upstream operation, parameterized by resource id where needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    ListAccounts,
    CreateAccount,
    GetAccount(&'a str),
    CreatePayout,
    GetPayout(&'a str),
    SearchPayouts,
    ExecutePayout(&'a str),
}

impl Operation<'_> {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListAccounts => "list_accounts",
            Self::CreateAccount => "create_account",
            Self::GetAccount(_) => "get_account",
            Self::CreatePayout => "create_payout",
            Self::GetPayout(_) => "get_payout",
            Self::SearchPayouts => "search_payouts",
            Self::ExecutePayout(_) => "execute_payout",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Self::ListAccounts | Self::GetAccount(_) | Self::GetPayout(_) => Method::GET,
            Self::CreateAccount | Self::CreatePayout | Self::SearchPayouts | Self::ExecutePayout(_) => {
                Method::POST
            }
        }
    }

    /// Path segments below the base URL. Ids are single segments.
    fn segments(&self) -> Vec<&str> {
        match *self {
            Self::ListAccounts | Self::CreateAccount => vec!["api", "accounts"],
            Self::GetAccount(id) => vec!["api", "accounts", id],
            Self::CreatePayout => vec!["api", "payouts", "payout"],
            Self::GetPayout(id) => vec!["api", "payouts", "payout", id],
            Self::SearchPayouts => vec!["api", "payouts", "search"],
            Self::ExecutePayout(id) => vec!["api", "payouts", "payout", id, "execute"],
        }
    }

    /// The resource id the operation addresses, if any.
    pub fn resource_id(&self) -> Option<&str> {
        match *self {
            Self::GetAccount(id) | Self::GetPayout(id) | Self::ExecutePayout(id) => Some(id),
            Self::ListAccounts | Self::CreateAccount | Self::CreatePayout | Self::SearchPayouts => {
                None
            }
        }
    }

    /// Whether the call needs the transfer credential.
    pub fn requires_transfer_key(&self) -> bool {
        matches!(self, Self::ExecutePayout(_))
    }
}

impl std::fmt::Display for Operation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything needed to issue one upstream call.
#[derive(Debug)]
pub struct ProviderRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl ProviderConfig {
    /// Builds the URL and headers for `op`.
    ///
    /// # Errors
    ///
    /// Returns [`PaydeskError::InvalidInput`](crate::PaydeskError::InvalidInput)
    /// if the resource id cannot stand as one path segment, and
    /// [`PaydeskError::Config`](crate::PaydeskError::Config) if a credential
    /// contains bytes that are not valid in a header, or if the operation
    /// needs the transfer key and none is configured.
    pub fn request(&self, op: &Operation<'_>) -> crate::Result<ProviderRequest> {
        if let Some(id) = op.resource_id()
            && !is_segment_safe(id)
        {
            return Err(crate::PaydeskError::InvalidInput(format!(
                "'{id}' is not a valid {} id",
                op.name()
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| crate::PaydeskError::Config("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(op.segments());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            sensitive(&format!("Bearer {}", self.api_key.as_str()), "MURAL_PAY_API_KEY")?,
        );
        headers.insert(ON_BEHALF_OF, sensitive(&self.org_id, "MURAL_PAY_ORG_ID")?);

        if op.requires_transfer_key() {
            let key = self.transfer_key.as_ref().ok_or_else(|| {
                crate::PaydeskError::Config("Transfer key is not configured".to_string())
            })?;
            headers.insert(TRANSFER_API_KEY, sensitive(key, "MURAL_PAY_TRANSFER_KEY")?);
        }

        Ok(ProviderRequest {
            method: op.method(),
            url,
            headers,
        })
    }
}

/// Whether `id` survives URL path building as exactly one segment.
/// Empty, `.` and `..` segments are collapsed by URL normalization.
pub fn is_segment_safe(id: &str) -> bool {
    !matches!(id, "" | "." | "..")
}

fn sensitive(value: &str, source: &str) -> crate::Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        crate::PaydeskError::Config(format!("{source} contains characters not allowed in a header"))
    })?;
    header.set_sensitive(true);
    Ok(header)
}

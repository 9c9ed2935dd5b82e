//! Application configuration loaded from environment variables.
//!
//! Credentials **must** be provided via environment variables (or the
//! keychain, see [`crate::credentials`]):
//! - `MURAL_PAY_API_KEY`: bearer token for every upstream call
//! - `MURAL_PAY_ORG_ID`: organization sent in the `on-behalf-of` header
//!
//! `MURAL_PAY_TRANSFER_KEY` is optional; without it payout execution is
//! refused. `MURAL_PAY_API_URL` overrides the upstream base URL and
//! `PAYDESK_BIND_ADDR` the listen address.

use reqwest::Url;
use zeroize::Zeroizing;

/// Default upstream endpoint (staging).
const DEFAULT_API_URL: &str = "https://api-staging.muralpay.com";

/// Default listen address for the proxy.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
}

/// Proxy listener settings.
#[derive(Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
}

/// Upstream payments provider settings.
///
/// Read-only after startup; shared behind an `Arc` by every in-flight
/// proxy call.
pub struct ProviderConfig {
    pub base_url: Url,
    pub api_key: Zeroizing<String>,
    pub org_id: String,
    pub transfer_key: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("org_id", &self.org_id)
            .field("transfer_key", &self.transfer_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ProviderConfig {
    /// Builds a provider configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`PaydeskError::Config`](crate::PaydeskError::Config) if the
    /// base URL cannot be parsed or is not an absolute http(s) URL.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        org_id: impl Into<String>,
        transfer_key: Option<String>,
    ) -> crate::Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            crate::PaydeskError::Config(format!("invalid MURAL_PAY_API_URL '{base_url}': {e}"))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(crate::PaydeskError::Config(format!(
                "MURAL_PAY_API_URL must be an http(s) URL, got '{base_url}'"
            )));
        }

        Ok(Self {
            base_url,
            api_key: Zeroizing::new(api_key.into()),
            org_id: org_id.into(),
            transfer_key: transfer_key.map(Zeroizing::new),
        })
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`PaydeskError::Config`](crate::PaydeskError::Config) if a
/// required credential is missing or the base URL is invalid.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let bind_addr =
        non_empty_var("PAYDESK_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    let base_url = non_empty_var("MURAL_PAY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let api_key = non_empty_var("MURAL_PAY_API_KEY").ok_or_else(|| {
        crate::PaydeskError::Config("MURAL_PAY_API_KEY is not set".to_string())
    })?;
    let org_id = non_empty_var("MURAL_PAY_ORG_ID")
        .ok_or_else(|| crate::PaydeskError::Config("MURAL_PAY_ORG_ID is not set".to_string()))?;
    let transfer_key = non_empty_var("MURAL_PAY_TRANSFER_KEY");

    Ok(AppConfig {
        server: ServerConfig { bind_addr },
        provider: ProviderConfig::new(&base_url, api_key, org_id, transfer_key)?,
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

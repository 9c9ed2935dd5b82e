//! Secret-store injection via the OS keychain.
//!
//! Provider credentials may live in the keychain instead of the shell
//! environment. At startup [`populate_env_from_keychain`] exports every
//! stored credential that the environment does not already define, so
//! [`crate::config::fetch_config`] sees a single source. Nothing here
//! supplies a default: a credential found in neither place stays missing
//! and configuration fails.

use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Keychain service name under which credentials are stored.
const SERVICE: &str = "paydesk";

/// Provider credentials that can be read from the keychain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialKey {
    ApiKey,
    OrgId,
    TransferKey,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 3] = [Self::ApiKey, Self::OrgId, Self::TransferKey];

    /// Keychain account name.
    pub fn keyring_id(self) -> &'static str {
        match self {
            Self::ApiKey => "mural_pay_api_key",
            Self::OrgId => "mural_pay_org_id",
            Self::TransferKey => "mural_pay_transfer_key",
        }
    }

    /// Environment variable read by [`crate::config::fetch_config`].
    pub fn env_var(self) -> &'static str {
        match self {
            Self::ApiKey => "MURAL_PAY_API_KEY",
            Self::OrgId => "MURAL_PAY_ORG_ID",
            Self::TransferKey => "MURAL_PAY_TRANSFER_KEY",
        }
    }
}

/// Reads one credential from the keychain.
///
/// # Errors
///
/// Returns [`PaydeskError::Config`](crate::PaydeskError::Config) if the
/// keychain cannot be opened or read. A missing entry is `Ok(None)`.
pub fn load(key: CredentialKey) -> crate::Result<Option<Zeroizing<String>>> {
    let entry = keyring::Entry::new(SERVICE, key.keyring_id())
        .map_err(|e| crate::PaydeskError::Config(format!("keychain unavailable: {e}")))?;
    match entry.get_password() {
        Ok(secret) => Ok(Some(Zeroizing::new(secret))),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(crate::PaydeskError::Config(format!(
            "failed to read {} from keychain: {e}",
            key.keyring_id()
        ))),
    }
}

/// Keys whose variable is unset or blank in the current environment.
fn unset_keys() -> impl Iterator<Item = CredentialKey> {
    CredentialKey::ALL.into_iter().filter(|key| {
        std::env::var(key.env_var())
            .map(|v| v.trim().is_empty())
            .unwrap_or(true)
    })
}

/// Exports keychain credentials for any variable the environment lacks and
/// returns the keys that were filled in.
///
/// Must run before the async runtime starts: it mutates the process
/// environment.
pub fn populate_env_from_keychain() -> Vec<CredentialKey> {
    let mut filled = Vec::new();
    for key in unset_keys() {
        match load(key) {
            Ok(Some(secret)) => {
                // SAFETY: single-threaded; no runtime or other thread exists yet.
                unsafe {
                    std::env::set_var(key.env_var(), secret.as_str());
                }
                debug!(var = key.env_var(), "credential loaded from keychain");
                filled.push(key);
            }
            Ok(None) => {}
            Err(e) => warn!(var = key.env_var(), error = %e, "keychain lookup failed"),
        }
    }
    filled
}

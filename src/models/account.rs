//! Account models.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// A provider account as returned by the accounts endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub is_api_enabled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Absent until the provider finishes provisioning.
    #[serde(default, deserialize_with = "complete_or_absent")]
    pub account_details: Option<AccountDetails>,
}

impl Account {
    /// Whether the account may be used as a payout source.
    pub fn is_api_enabled(&self) -> bool {
        self.is_api_enabled
    }

    /// Whether the provider is still provisioning wallet and bank details.
    pub fn is_processing(&self) -> bool {
        self.account_details.is_none()
    }
}

/// Wallet, balances and deposit account of a provisioned account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    pub wallet_details: WalletDetails,
    pub balances: Vec<Balance>,
    pub deposit_account: DepositAccount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDetails {
    pub wallet_address: String,
    pub blockchain: String,
}

/// A token balance held by the account wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(with = "rust_decimal::serde::float")]
    pub token_amount: Decimal,
    pub token_symbol: String,
}

/// Bank account that funds can be deposited to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAccount {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    pub bank_name: String,
    pub bank_account_number: String,
    #[serde(default)]
    pub bank_routing_number: String,
    #[serde(default)]
    pub bank_beneficiary_name: String,
    #[serde(default)]
    pub payment_rails: Vec<String>,
}

/// Body of a create-account request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub name: String,
}

impl CreateAccountRequest {
    /// Rejects blank names.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Account name is required".into());
        }
        Ok(())
    }
}

/// Accepts `accountDetails` only when it is complete; a null, missing or
/// partially populated object is reported as still processing.
fn complete_or_absent<'de, D>(deserializer: D) -> Result<Option<AccountDetails>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => match serde_json::from_value(value) {
            Ok(details) => Some(details),
            Err(e) => {
                debug!(error = %e, "incomplete accountDetails, treating as processing");
                None
            }
        },
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn details_json() -> serde_json::Value {
        json!({
            "walletDetails": { "walletAddress": "0xabc", "blockchain": "POLYGON" },
            "balances": [{ "tokenAmount": 12.5, "tokenSymbol": "USDC" }],
            "depositAccount": {
                "bankName": "Lead Bank",
                "bankAccountNumber": "123",
                "bankRoutingNumber": "101019644",
                "bankBeneficiaryName": "Ops LLC",
                "paymentRails": ["ach", "wire"]
            }
        })
    }

    #[test]
    fn full_details_deserialize() {
        let account: Account = serde_json::from_value(json!({
            "id": "a1", "name": "Ops", "status": "ACTIVE", "isApiEnabled": true,
            "accountDetails": details_json()
        }))
        .unwrap();

        let details = account.account_details.as_ref().unwrap();
        assert_eq!(details.balances[0].token_amount, dec!(12.5));
        assert_eq!(details.deposit_account.payment_rails, vec!["ach", "wire"]);
        assert!(!account.is_processing());
        assert!(account.is_api_enabled());
    }

    #[test]
    fn missing_or_null_details_is_processing() {
        let missing: Account =
            serde_json::from_value(json!({ "id": "a1", "name": "Ops", "status": "PENDING" }))
                .unwrap();
        let null: Account = serde_json::from_value(
            json!({ "id": "a1", "name": "Ops", "status": "PENDING", "accountDetails": null }),
        )
        .unwrap();

        assert!(missing.is_processing());
        assert!(null.is_processing());
        assert!(!missing.is_api_enabled());
    }

    #[test]
    fn partial_details_is_processing() {
        let account: Account = serde_json::from_value(json!({
            "id": "a1", "name": "Ops", "status": "PENDING",
            "accountDetails": { "walletDetails": { "walletAddress": "0xabc", "blockchain": "POLYGON" } }
        }))
        .unwrap();

        assert!(account.is_processing());
    }

    #[test]
    fn blank_name_fails_validation() {
        assert!(CreateAccountRequest { name: "  ".into() }.validate().is_err());
        assert!(CreateAccountRequest { name: "Ops".into() }.validate().is_ok());
    }
}

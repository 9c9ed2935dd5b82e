//! Payout batch models returned by the search and get endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payout_request::TokenAmount;

/// Status of a payout batch.
///
/// Statuses this crate acts on are named; everything else is carried
/// verbatim in [`PayoutStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PayoutStatus {
    AwaitingExecution,
    Pending,
    Executed,
    Failed,
    Canceled,
    Other(String),
}

impl PayoutStatus {
    /// Returns the wire-format status string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::AwaitingExecution => "AWAITING_EXECUTION",
            Self::Pending => "PENDING",
            Self::Executed => "EXECUTED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
            Self::Other(s) => s,
        }
    }

    /// Whether the batch can be executed from the dashboard.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::AwaitingExecution)
    }

    /// Badge classification used by the history views.
    pub fn tone(&self) -> StatusTone {
        match self {
            Self::Executed => StatusTone::Completed,
            Self::Pending | Self::AwaitingExecution => StatusTone::Pending,
            Self::Failed | Self::Canceled => StatusTone::Failed,
            Self::Other(s) if s.eq_ignore_ascii_case("completed") => StatusTone::Completed,
            Self::Other(_) => StatusTone::Neutral,
        }
    }
}

impl From<String> for PayoutStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "AWAITING_EXECUTION" => Self::AwaitingExecution,
            "PENDING" => Self::Pending,
            "EXECUTED" => Self::Executed,
            "FAILED" => Self::Failed,
            "CANCELED" => Self::Canceled,
            _ => Self::Other(s),
        }
    }
}

impl From<PayoutStatus> for String {
    fn from(status: PayoutStatus) -> Self {
        match status {
            PayoutStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// Coarse status grouping for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Completed,
    Pending,
    Failed,
    Neutral,
}

/// A batch of payouts created from one source account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutBatch {
    pub id: String,
    pub status: PayoutStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub source_account_id: String,
    #[serde(default)]
    pub payouts: Vec<PayoutLeg>,
}

/// One line item within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutLeg {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub amount: TokenAmount,
    #[serde(default)]
    pub details: Option<PayoutLegDetails>,
}

/// Fiat conversion and delivery details of a payout leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutLegDetails {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub fiat_and_rail_code: Option<String>,
    #[serde(default)]
    pub fiat_amount: Option<FiatAmount>,
    #[serde(default)]
    pub transaction_fee: Option<TokenAmount>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub exchange_fee_percentage: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub exchange_rate: Option<Decimal>,
    #[serde(default)]
    pub fee_total: Option<TokenAmount>,
    #[serde(default)]
    pub fiat_payout_status: Option<FiatPayoutStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatAmount {
    #[serde(with = "rust_decimal::serde::float")]
    pub fiat_amount: Decimal,
    pub fiat_currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiatPayoutStatus {
    #[serde(rename = "type")]
    pub kind: String,
}

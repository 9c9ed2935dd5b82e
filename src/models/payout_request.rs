//! Outbound payout creation models.
//!
//! [`RecipientInfo`] is a sum type tagged by `type` on the wire
//! (`"individual"` / `"business"`); each variant carries only its own
//! required fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A token quantity, e.g. `10.5 USDC`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    #[serde(with = "rust_decimal::serde::float")]
    pub token_amount: Decimal,
    pub token_symbol: String,
}

/// Body of a create-payout request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayoutRequest {
    pub source_account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub payouts: Vec<PayoutRequest>,
}

/// One payout to be created within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequest {
    pub amount: TokenAmount,
    pub payout_details: FiatPayoutDetails,
    pub recipient_info: RecipientInfo,
    pub supporting_details: SupportingDetails,
}

/// Fiat bank delivery details.
///
/// Serialized with `"type": "fiat"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "fiat", rename_all = "camelCase")]
pub struct FiatPayoutDetails {
    pub bank_name: String,
    pub bank_account_owner: String,
    pub fiat_and_rail_details: FiatAndRailDetails,
}

/// USD rail details. Serialized with `"type": "usd"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "usd", rename_all = "camelCase")]
pub struct FiatAndRailDetails {
    pub symbol: String,
    pub account_type: AccountType,
    pub bank_account_number: String,
    pub bank_routing_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Checking,
    Savings,
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CHECKING" => Ok(Self::Checking),
            "SAVINGS" => Ok(Self::Savings),
            other => Err(format!("unknown account type '{other}'")),
        }
    }
}

/// Who receives the payout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecipientInfo {
    Individual(IndividualRecipientInfo),
    Business(BusinessRecipientInfo),
}

impl RecipientInfo {
    pub fn kind(&self) -> RecipientKind {
        match self {
            Self::Individual(_) => RecipientKind::Individual,
            Self::Business(_) => RecipientKind::Business,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Self::Individual(info) => &info.email,
            Self::Business(info) => &info.email,
        }
    }

    /// Human-readable recipient name.
    pub fn display_name(&self) -> String {
        match self {
            Self::Individual(info) => format!("{} {}", info.first_name, info.last_name),
            Self::Business(info) => info.business_name.clone(),
        }
    }
}

/// Discriminant of [`RecipientInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientKind {
    Individual,
    Business,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualRecipientInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: String,
    pub physical_address: PhysicalAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRecipientInfo {
    pub business_name: String,
    pub tax_id: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAddress {
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub country: String,
    pub state: String,
    pub city: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportingDetails {
    pub payout_purpose: PayoutPurpose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutPurpose {
    VendorPayment,
    Payroll,
    Other,
}

impl std::str::FromStr for PayoutPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "VENDOR_PAYMENT" => Ok(Self::VendorPayment),
            "PAYROLL" => Ok(Self::Payroll),
            "OTHER" => Ok(Self::Other),
            other => Err(format!("unknown payout purpose '{other}'")),
        }
    }
}

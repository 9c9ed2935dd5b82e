//! Uncommitted payout drafts and typed field edits.
//!
//! Form inputs address fields by path (`amount.tokenAmount`,
//! `payoutDetails.fiatAndRailDetails.bankRoutingNumber`, ...).
//! [`DraftEdit::parse`] turns such a path into a typed edit up front, so an
//! unknown path or a field that does not exist on the draft's recipient kind
//! is reported instead of silently ignored.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::{
    Account, AccountType, BusinessRecipientInfo, FiatAndRailDetails, FiatPayoutDetails,
    IndividualRecipientInfo, PayoutPurpose, PayoutRequest, PhysicalAddress, RecipientInfo,
    RecipientKind, SupportingDetails, TokenAmount,
};

/// Errors raised while editing drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("unknown payout field '{0}'")]
    UnknownField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("field applies to {expected:?} recipients, draft has a {found:?} recipient")]
    RecipientMismatch {
        expected: RecipientKind,
        found: RecipientKind,
    },

    #[error("no draft payout at index {0}")]
    NoSuchDraft(usize),

    #[error("account {0} has no bank details yet")]
    AccountProcessing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndividualField {
    FirstName,
    LastName,
    DateOfBirth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessField {
    BusinessName,
    TaxId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Address1,
    Address2,
    Country,
    State,
    City,
    Zip,
}

/// A single typed change to one draft payout.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftEdit {
    TokenAmount(Decimal),
    TokenSymbol(String),
    BankName(String),
    BankAccountOwner(String),
    RailSymbol(String),
    AccountType(AccountType),
    BankAccountNumber(String),
    BankRoutingNumber(String),
    RecipientEmail(String),
    Individual(IndividualField, String),
    Address(AddressField, String),
    Business(BusinessField, String),
    PayoutPurpose(PayoutPurpose),
}

impl DraftEdit {
    /// Parses a form field path and its raw value.
    ///
    /// # Errors
    ///
    /// [`DraftError::UnknownField`] for paths that name no field, and
    /// [`DraftError::InvalidValue`] when the value does not fit the field.
    pub fn parse(path: &str, value: &str) -> Result<Self, DraftError> {
        let owned = || value.to_string();
        let edit = match path {
            "amount.tokenAmount" => Self::TokenAmount(parse_value(path, value)?),
            "amount.tokenSymbol" => Self::TokenSymbol(owned()),
            "payoutDetails.bankName" => Self::BankName(owned()),
            "payoutDetails.bankAccountOwner" => Self::BankAccountOwner(owned()),
            "payoutDetails.fiatAndRailDetails.symbol" => Self::RailSymbol(owned()),
            "payoutDetails.fiatAndRailDetails.accountType" => {
                Self::AccountType(parse_value(path, value)?)
            }
            "payoutDetails.fiatAndRailDetails.bankAccountNumber" => {
                Self::BankAccountNumber(owned())
            }
            "payoutDetails.fiatAndRailDetails.bankRoutingNumber" => {
                Self::BankRoutingNumber(owned())
            }
            "recipientInfo.email" => Self::RecipientEmail(owned()),
            "recipientInfo.firstName" => Self::Individual(IndividualField::FirstName, owned()),
            "recipientInfo.lastName" => Self::Individual(IndividualField::LastName, owned()),
            "recipientInfo.dateOfBirth" => Self::Individual(IndividualField::DateOfBirth, owned()),
            "recipientInfo.businessName" => Self::Business(BusinessField::BusinessName, owned()),
            "recipientInfo.taxId" => Self::Business(BusinessField::TaxId, owned()),
            "supportingDetails.payoutPurpose" => Self::PayoutPurpose(parse_value(path, value)?),
            other => match other.strip_prefix("recipientInfo.physicalAddress.") {
                Some("address1") => Self::Address(AddressField::Address1, owned()),
                Some("address2") => Self::Address(AddressField::Address2, owned()),
                Some("country") => Self::Address(AddressField::Country, owned()),
                Some("state") => Self::Address(AddressField::State, owned()),
                Some("city") => Self::Address(AddressField::City, owned()),
                Some("zip") => Self::Address(AddressField::Zip, owned()),
                _ => return Err(DraftError::UnknownField(path.to_string())),
            },
        };
        Ok(edit)
    }

    /// Applies the edit, touching only the addressed field.
    ///
    /// # Errors
    ///
    /// [`DraftError::RecipientMismatch`] when a recipient field does not
    /// exist on the draft's recipient kind.
    pub fn apply(self, draft: &mut PayoutRequest) -> Result<(), DraftError> {
        match self {
            Self::TokenAmount(amount) => draft.amount.token_amount = amount,
            Self::TokenSymbol(symbol) => draft.amount.token_symbol = symbol,
            Self::BankName(name) => draft.payout_details.bank_name = name,
            Self::BankAccountOwner(owner) => draft.payout_details.bank_account_owner = owner,
            Self::RailSymbol(symbol) => {
                draft.payout_details.fiat_and_rail_details.symbol = symbol
            }
            Self::AccountType(kind) => {
                draft.payout_details.fiat_and_rail_details.account_type = kind
            }
            Self::BankAccountNumber(number) => {
                draft.payout_details.fiat_and_rail_details.bank_account_number = number
            }
            Self::BankRoutingNumber(number) => {
                draft.payout_details.fiat_and_rail_details.bank_routing_number = number
            }
            Self::PayoutPurpose(purpose) => draft.supporting_details.payout_purpose = purpose,
            Self::RecipientEmail(email) => match &mut draft.recipient_info {
                RecipientInfo::Individual(info) => info.email = email,
                RecipientInfo::Business(info) => info.email = email,
            },
            Self::Individual(field, value) => {
                let info = individual(&mut draft.recipient_info)?;
                match field {
                    IndividualField::FirstName => info.first_name = value,
                    IndividualField::LastName => info.last_name = value,
                    IndividualField::DateOfBirth => info.date_of_birth = value,
                }
            }
            Self::Address(field, value) => {
                let address = &mut individual(&mut draft.recipient_info)?.physical_address;
                match field {
                    AddressField::Address1 => address.address1 = value,
                    AddressField::Address2 => {
                        address.address2 = Some(value).filter(|v| !v.trim().is_empty())
                    }
                    AddressField::Country => address.country = value,
                    AddressField::State => address.state = value,
                    AddressField::City => address.city = value,
                    AddressField::Zip => address.zip = value,
                }
            }
            Self::Business(field, value) => match &mut draft.recipient_info {
                RecipientInfo::Business(info) => match field {
                    BusinessField::BusinessName => info.business_name = value,
                    BusinessField::TaxId => info.tax_id = value,
                },
                other => {
                    return Err(DraftError::RecipientMismatch {
                        expected: RecipientKind::Business,
                        found: other.kind(),
                    });
                }
            },
        }
        Ok(())
    }
}

fn individual(recipient: &mut RecipientInfo) -> Result<&mut IndividualRecipientInfo, DraftError> {
    match recipient {
        RecipientInfo::Individual(info) => Ok(info),
        other => Err(DraftError::RecipientMismatch {
            expected: RecipientKind::Individual,
            found: other.kind(),
        }),
    }
}

fn parse_value<T>(field: &str, value: &str) -> Result<T, DraftError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| DraftError::InvalidValue {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// A saved payee whose bank details can be copied into a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownRecipient {
    pub name: String,
    pub routing_number: String,
    pub account_number: String,
    pub account_type: AccountType,
}

/// The list of drafts being composed into one create-payout request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftPayouts {
    drafts: Vec<PayoutRequest>,
}

impl DraftPayouts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[PayoutRequest] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Appends a draft built from [`blank_payout`].
    pub fn add(&mut self) {
        self.drafts.push(blank_payout());
    }

    pub fn remove(&mut self, index: usize) -> Result<PayoutRequest, DraftError> {
        if index >= self.drafts.len() {
            return Err(DraftError::NoSuchDraft(index));
        }
        Ok(self.drafts.remove(index))
    }

    pub fn edit(&mut self, index: usize, edit: DraftEdit) -> Result<(), DraftError> {
        edit.apply(self.get_mut(index)?)
    }

    /// Replaces the recipient with a blank one of `kind`, keeping the email.
    /// Switching to the kind the draft already has changes nothing.
    pub fn switch_recipient_kind(
        &mut self,
        index: usize,
        kind: RecipientKind,
    ) -> Result<(), DraftError> {
        let draft = self.get_mut(index)?;
        if draft.recipient_info.kind() == kind {
            return Ok(());
        }
        let email = draft.recipient_info.email().to_string();
        draft.recipient_info = match kind {
            RecipientKind::Individual => RecipientInfo::Individual(IndividualRecipientInfo {
                first_name: String::new(),
                last_name: String::new(),
                email,
                date_of_birth: String::new(),
                physical_address: blank_address(),
            }),
            RecipientKind::Business => RecipientInfo::Business(BusinessRecipientInfo {
                business_name: String::new(),
                tax_id: String::new(),
                email,
            }),
        };
        Ok(())
    }

    /// Copies bank details from `account`'s deposit account.
    pub fn prefill_from_account(&mut self, index: usize, account: &Account) -> Result<(), DraftError> {
        let details = account
            .account_details
            .as_ref()
            .ok_or_else(|| DraftError::AccountProcessing(account.id.clone()))?;
        let deposit = &details.deposit_account;

        self.get_mut(index)?.payout_details = FiatPayoutDetails {
            bank_name: deposit.bank_name.clone(),
            bank_account_owner: deposit.bank_beneficiary_name.clone(),
            fiat_and_rail_details: FiatAndRailDetails {
                symbol: "USD".into(),
                account_type: AccountType::Checking,
                bank_account_number: deposit.bank_account_number.clone(),
                bank_routing_number: deposit.bank_routing_number.clone(),
            },
        };
        Ok(())
    }

    /// Copies a saved payee's bank details.
    pub fn apply_known_recipient(
        &mut self,
        index: usize,
        recipient: &KnownRecipient,
    ) -> Result<(), DraftError> {
        let details = &mut self.get_mut(index)?.payout_details;
        details.bank_account_owner = recipient.name.clone();
        details.fiat_and_rail_details.account_type = recipient.account_type;
        details.fiat_and_rail_details.bank_account_number = recipient.account_number.clone();
        details.fiat_and_rail_details.bank_routing_number = recipient.routing_number.clone();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.drafts.clear();
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut PayoutRequest, DraftError> {
        self.drafts.get_mut(index).ok_or(DraftError::NoSuchDraft(index))
    }
}

/// A fresh draft: zero USDC to a USD checking account, individual recipient,
/// vendor payment.
pub fn blank_payout() -> PayoutRequest {
    PayoutRequest {
        amount: TokenAmount {
            token_amount: Decimal::ZERO,
            token_symbol: "USDC".into(),
        },
        payout_details: FiatPayoutDetails {
            bank_name: String::new(),
            bank_account_owner: String::new(),
            fiat_and_rail_details: FiatAndRailDetails {
                symbol: "USD".into(),
                account_type: AccountType::Checking,
                bank_account_number: String::new(),
                bank_routing_number: String::new(),
            },
        },
        recipient_info: RecipientInfo::Individual(IndividualRecipientInfo {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            date_of_birth: String::new(),
            physical_address: blank_address(),
        }),
        supporting_details: SupportingDetails {
            payout_purpose: PayoutPurpose::VendorPayment,
        },
    }
}

fn blank_address() -> PhysicalAddress {
    PhysicalAddress {
        country: "US".into(),
        ..PhysicalAddress::default()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn drafts_with(count: usize) -> DraftPayouts {
        let mut drafts = DraftPayouts::new();
        for _ in 0..count {
            drafts.add();
        }
        drafts
    }

    #[test]
    fn token_amount_path_touches_only_that_field() {
        let mut drafts = drafts_with(2);
        drafts
            .edit(0, DraftEdit::parse("recipientInfo.firstName", "Ada").unwrap())
            .unwrap();
        let before = drafts.as_slice()[0].clone();

        drafts
            .edit(0, DraftEdit::parse("amount.tokenAmount", "150.5").unwrap())
            .unwrap();

        let after = &drafts.as_slice()[0];
        assert_eq!(after.amount.token_amount, dec!(150.5));
        assert_eq!(after.amount.token_symbol, before.amount.token_symbol);
        assert_eq!(after.recipient_info, before.recipient_info);
        assert_eq!(after.payout_details, before.payout_details);
        assert_eq!(drafts.as_slice()[1], blank_payout());
    }

    #[test]
    fn nested_rail_path_is_typed() {
        let mut drafts = drafts_with(1);
        drafts
            .edit(
                0,
                DraftEdit::parse("payoutDetails.fiatAndRailDetails.bankRoutingNumber", "021000021")
                    .unwrap(),
            )
            .unwrap();
        drafts
            .edit(
                0,
                DraftEdit::parse("payoutDetails.fiatAndRailDetails.accountType", "savings").unwrap(),
            )
            .unwrap();

        let rail = &drafts.as_slice()[0].payout_details.fiat_and_rail_details;
        assert_eq!(rail.bank_routing_number, "021000021");
        assert_eq!(rail.account_type, AccountType::Savings);
    }

    #[test]
    fn unknown_path_is_an_error() {
        assert_eq!(
            DraftEdit::parse("payoutDetails.bankNmae", "x"),
            Err(DraftError::UnknownField("payoutDetails.bankNmae".into()))
        );
        assert!(DraftEdit::parse("recipientInfo.physicalAddress.planet", "x").is_err());
    }

    #[test]
    fn bad_amount_is_an_error() {
        let err = DraftEdit::parse("amount.tokenAmount", "lots").unwrap_err();
        assert!(matches!(err, DraftError::InvalidValue { .. }));
    }

    #[test]
    fn individual_field_on_business_recipient_is_rejected() {
        let mut drafts = drafts_with(1);
        drafts.switch_recipient_kind(0, RecipientKind::Business).unwrap();

        let err = drafts
            .edit(0, DraftEdit::parse("recipientInfo.physicalAddress.city", "Austin").unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            DraftError::RecipientMismatch {
                expected: RecipientKind::Individual,
                found: RecipientKind::Business,
            }
        );

        drafts
            .edit(0, DraftEdit::parse("recipientInfo.businessName", "Acme").unwrap())
            .unwrap();
        let value = serde_json::to_value(&drafts.as_slice()[0].recipient_info).unwrap();
        assert_eq!(value["type"], "business");
        assert_eq!(value["businessName"], "Acme");
    }

    #[test]
    fn switching_recipient_kind_keeps_email() {
        let mut drafts = drafts_with(1);
        drafts
            .edit(0, DraftEdit::parse("recipientInfo.email", "pay@acme.test").unwrap())
            .unwrap();
        drafts.switch_recipient_kind(0, RecipientKind::Business).unwrap();

        assert_eq!(drafts.as_slice()[0].recipient_info.email(), "pay@acme.test");
        assert_eq!(drafts.as_slice()[0].recipient_info.kind(), RecipientKind::Business);
    }

    #[test]
    fn blank_address2_serializes_as_absent() {
        let mut drafts = drafts_with(1);
        drafts
            .edit(0, DraftEdit::parse("recipientInfo.physicalAddress.address2", " ").unwrap())
            .unwrap();
        let value = serde_json::to_value(&drafts.as_slice()[0]).unwrap();
        assert!(value["recipientInfo"]["physicalAddress"].get("address2").is_none());
    }

    #[test]
    fn remove_by_index() {
        let mut drafts = drafts_with(3);
        drafts
            .edit(1, DraftEdit::TokenSymbol("USDT".into()))
            .unwrap();

        let removed = drafts.remove(1).unwrap();
        assert_eq!(removed.amount.token_symbol, "USDT");
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts.remove(5), Err(DraftError::NoSuchDraft(5)));
    }

    #[test]
    fn prefill_copies_deposit_account() {
        let account: Account = serde_json::from_value(json!({
            "id": "a1", "name": "Ops", "status": "ACTIVE", "isApiEnabled": true,
            "accountDetails": {
                "walletDetails": { "walletAddress": "0xabc", "blockchain": "POLYGON" },
                "balances": [],
                "depositAccount": {
                    "bankName": "Lead Bank",
                    "bankAccountNumber": "555",
                    "bankRoutingNumber": "101019644",
                    "bankBeneficiaryName": "Ops LLC",
                    "paymentRails": ["ach"]
                }
            }
        }))
        .unwrap();

        let mut drafts = drafts_with(1);
        drafts.prefill_from_account(0, &account).unwrap();

        let details = &drafts.as_slice()[0].payout_details;
        assert_eq!(details.bank_name, "Lead Bank");
        assert_eq!(details.bank_account_owner, "Ops LLC");
        assert_eq!(details.fiat_and_rail_details.bank_account_number, "555");
        assert_eq!(details.fiat_and_rail_details.bank_routing_number, "101019644");
    }

    #[test]
    fn prefill_from_processing_account_is_refused() {
        let account: Account =
            serde_json::from_value(json!({ "id": "a2", "name": "New", "status": "PENDING" }))
                .unwrap();
        let mut drafts = drafts_with(1);

        assert_eq!(
            drafts.prefill_from_account(0, &account),
            Err(DraftError::AccountProcessing("a2".into()))
        );
        assert_eq!(drafts.as_slice()[0], blank_payout());
    }

    #[test]
    fn known_recipient_fills_bank_fields() {
        let mut drafts = drafts_with(1);
        let payee = KnownRecipient {
            name: "Test Recipient".into(),
            routing_number: "101019644".into(),
            account_number: "123456789".into(),
            account_type: AccountType::Savings,
        };
        drafts.apply_known_recipient(0, &payee).unwrap();

        let details = &drafts.as_slice()[0].payout_details;
        assert_eq!(details.bank_account_owner, "Test Recipient");
        assert_eq!(details.fiat_and_rail_details.account_type, AccountType::Savings);
        assert_eq!(details.fiat_and_rail_details.bank_account_number, "123456789");
    }
}

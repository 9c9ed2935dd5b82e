//! Typed mirrors of the upstream provider's resources.
//!
//! These are transient, request-scoped copies; the provider owns their
//! lifecycle. Field names follow the provider's camelCase wire format.

pub mod account;
pub mod payout;
pub mod payout_request;

pub use account::{Account, AccountDetails, Balance, CreateAccountRequest, DepositAccount};
pub use payout::{PayoutBatch, PayoutLeg, PayoutStatus, StatusTone};
pub use payout_request::{
    AccountType, BusinessRecipientInfo, CreatePayoutRequest, FiatAndRailDetails,
    FiatPayoutDetails, IndividualRecipientInfo, PayoutPurpose, PayoutRequest, PhysicalAddress,
    RecipientInfo, RecipientKind, SupportingDetails, TokenAmount,
};

//! Payouts page: compose and submit payout batches, execute pending ones,
//! browse history overall and per source account.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::api::DashboardApi;
use super::draft::{DraftEdit, DraftError, DraftPayouts, KnownRecipient};
use super::guard::{FetchGuard, Ticket};
use super::runner::Page;
use crate::PaydeskError;
use crate::models::{
    Account, CreatePayoutRequest, PayoutBatch, PayoutStatus, RecipientKind, StatusTone,
};

/// Sub-views of the payouts page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayoutsTab {
    #[default]
    Create,
    Execute,
    Account,
}

/// Client-side filter over the history list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
    Failed,
}

impl StatusFilter {
    pub fn matches(self, status: &PayoutStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status.tone() == StatusTone::Pending,
            Self::Completed => status.tone() == StatusTone::Completed,
            Self::Failed => status.tone() == StatusTone::Failed,
        }
    }
}

/// The create-payout form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayoutForm {
    pub source_account_id: String,
    pub memo: String,
    pub drafts: DraftPayouts,
}

impl PayoutForm {
    /// Builds the request body, or says what is missing.
    pub fn to_request(&self) -> Result<CreatePayoutRequest, &'static str> {
        if self.source_account_id.trim().is_empty() {
            return Err("Select a source account");
        }
        if self.drafts.is_empty() {
            return Err("Add at least one payout");
        }
        let memo = self.memo.trim();
        Ok(CreatePayoutRequest {
            source_account_id: self.source_account_id.clone(),
            memo: (!memo.is_empty()).then(|| memo.to_string()),
            payouts: self.drafts.as_slice().to_vec(),
        })
    }

    fn clear(&mut self) {
        self.source_account_id.clear();
        self.memo.clear();
        self.drafts.clear();
    }
}

/// State of the payouts page.
#[derive(Debug, Default)]
pub struct PayoutsPage {
    /// API-enabled accounts, offered as payout sources.
    pub accounts: Vec<Account>,
    pub payout_history: Vec<PayoutBatch>,
    pub loading_history: bool,
    pub status_filter: StatusFilter,
    pub active_tab: PayoutsTab,
    /// The payout currently being executed, if any.
    pub executing_id: Option<String>,
    pub selected_account_for_view: Option<String>,
    pub account_payouts: Vec<PayoutBatch>,
    pub loading_account_payouts: bool,
    pub form: PayoutForm,
    pub submitting: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    accounts_guard: FetchGuard,
    history_guard: FetchGuard,
    account_payouts_guard: FetchGuard,
}

impl PayoutsPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches waiting to be executed, in history order.
    pub fn execute_queue(&self) -> Vec<&PayoutBatch> {
        execute_queue(&self.payout_history)
    }

    /// History narrowed by the current status filter.
    pub fn filtered_history(&self) -> Vec<&PayoutBatch> {
        filtered_history(&self.payout_history, self.status_filter)
    }

    fn find_account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }
}

/// Accounts that can fund a payout.
pub fn eligible_accounts(accounts: Vec<Account>) -> Vec<Account> {
    accounts.into_iter().filter(Account::is_api_enabled).collect()
}

/// Batches drawn from `account_id`, in source order.
pub fn payouts_for_account<'a>(
    history: &'a [PayoutBatch],
    account_id: &'a str,
) -> impl Iterator<Item = &'a PayoutBatch> + 'a {
    history
        .iter()
        .filter(move |batch| batch.source_account_id == account_id)
}

pub fn execute_queue(history: &[PayoutBatch]) -> Vec<&PayoutBatch> {
    history
        .iter()
        .filter(|batch| batch.status.is_actionable())
        .collect()
}

pub fn filtered_history(history: &[PayoutBatch], filter: StatusFilter) -> Vec<&PayoutBatch> {
    history
        .iter()
        .filter(|batch| filter.matches(&batch.status))
        .collect()
}

/// Messages that update the payouts page.
#[derive(Debug)]
pub enum PayoutsMessage {
    Mounted,
    TabSelected(PayoutsTab),
    StatusFilterChanged(StatusFilter),
    RefreshHistory,
    SourceAccountSelected(String),
    MemoChanged(String),
    AddDraft,
    RemoveDraft(usize),
    EditDraft { index: usize, edit: DraftEdit },
    SwitchRecipientKind { index: usize, kind: RecipientKind },
    PrefillDraft { index: usize, account_id: String },
    ApplyKnownRecipient { index: usize, recipient: KnownRecipient },
    SubmitCreate,
    ExecuteRequested(String),
    AccountForViewSelected(Option<String>),

    AccountsLoaded {
        ticket: Ticket,
        result: Result<Vec<Account>, PaydeskError>,
    },
    HistoryLoaded {
        ticket: Ticket,
        result: Result<Vec<PayoutBatch>, PaydeskError>,
    },
    AccountPayoutsLoaded {
        ticket: Ticket,
        account_id: String,
        result: Result<Vec<PayoutBatch>, PaydeskError>,
    },
    PayoutCreated(Result<Value, PaydeskError>),
    PayoutExecuted {
        id: String,
        result: Result<Value, PaydeskError>,
    },
}

impl PayoutsMessage {
    /// Whether the message is a user action, which dismisses banners.
    fn is_user_action(&self) -> bool {
        !matches!(
            self,
            Self::Mounted
                | Self::AccountsLoaded { .. }
                | Self::HistoryLoaded { .. }
                | Self::AccountPayoutsLoaded { .. }
                | Self::PayoutCreated(_)
                | Self::PayoutExecuted { .. }
        )
    }
}

/// Proxy calls the payouts page can trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum PayoutsAction {
    FetchAccounts(Ticket),
    FetchHistory(Ticket),
    FetchAccountPayouts { ticket: Ticket, account_id: String },
    CreatePayout(CreatePayoutRequest),
    ExecutePayout(String),
}

/// Updates the payouts page based on a message.
pub fn update(page: &mut PayoutsPage, message: PayoutsMessage) -> Vec<PayoutsAction> {
    if message.is_user_action() {
        page.error = None;
        page.success = None;
    }

    match message {
        PayoutsMessage::Mounted => vec![fetch_accounts(page), fetch_history(page)],
        PayoutsMessage::TabSelected(tab) => {
            page.active_tab = tab;
            match (tab, page.selected_account_for_view.clone()) {
                (PayoutsTab::Account, Some(account_id)) => {
                    vec![fetch_account_payouts(page, account_id)]
                }
                _ => Vec::new(),
            }
        }
        PayoutsMessage::StatusFilterChanged(filter) => {
            page.status_filter = filter;
            Vec::new()
        }
        PayoutsMessage::RefreshHistory => vec![fetch_history(page)],
        PayoutsMessage::SourceAccountSelected(id) => {
            page.form.source_account_id = id;
            Vec::new()
        }
        PayoutsMessage::MemoChanged(memo) => {
            page.form.memo = memo;
            Vec::new()
        }
        PayoutsMessage::AddDraft => {
            page.form.drafts.add();
            Vec::new()
        }
        PayoutsMessage::RemoveDraft(index) => {
            let result = page.form.drafts.remove(index).map(drop);
            report(page, result);
            Vec::new()
        }
        PayoutsMessage::EditDraft { index, edit } => {
            let result = page.form.drafts.edit(index, edit);
            report(page, result);
            Vec::new()
        }
        PayoutsMessage::SwitchRecipientKind { index, kind } => {
            let result = page.form.drafts.switch_recipient_kind(index, kind);
            report(page, result);
            Vec::new()
        }
        PayoutsMessage::PrefillDraft { index, account_id } => {
            let result = match page.find_account(&account_id).cloned() {
                Some(account) => page.form.drafts.prefill_from_account(index, &account),
                None => Err(DraftError::AccountProcessing(account_id)),
            };
            report(page, result);
            Vec::new()
        }
        PayoutsMessage::ApplyKnownRecipient { index, recipient } => {
            let result = page.form.drafts.apply_known_recipient(index, &recipient);
            report(page, result);
            Vec::new()
        }
        PayoutsMessage::SubmitCreate => {
            if page.submitting {
                return Vec::new();
            }
            match page.form.to_request() {
                Ok(request) => {
                    page.submitting = true;
                    vec![PayoutsAction::CreatePayout(request)]
                }
                Err(reason) => {
                    page.error = Some(reason.to_string());
                    Vec::new()
                }
            }
        }
        PayoutsMessage::ExecuteRequested(id) => {
            if page.executing_id.is_some() || id.trim().is_empty() {
                debug!(%id, "execute ignored");
                return Vec::new();
            }
            page.executing_id = Some(id.clone());
            vec![PayoutsAction::ExecutePayout(id)]
        }
        PayoutsMessage::AccountForViewSelected(selection) => {
            page.selected_account_for_view = selection.clone();
            match selection {
                Some(account_id) => vec![fetch_account_payouts(page, account_id)],
                None => {
                    page.account_payouts_guard.invalidate();
                    page.account_payouts.clear();
                    page.loading_account_payouts = false;
                    Vec::new()
                }
            }
        }

        PayoutsMessage::AccountsLoaded { ticket, result } => {
            if page.accounts_guard.admit(ticket) {
                match result {
                    Ok(accounts) => page.accounts = eligible_accounts(accounts),
                    Err(e) => {
                        warn!(error = %e, "failed to fetch accounts");
                        page.error = Some("Failed to fetch accounts".into());
                        page.accounts.clear();
                    }
                }
            }
            Vec::new()
        }
        PayoutsMessage::HistoryLoaded { ticket, result } => {
            if page.history_guard.is_latest(ticket) {
                page.loading_history = false;
            }
            if page.history_guard.admit(ticket) {
                match result {
                    Ok(history) => page.payout_history = history,
                    Err(e) => {
                        warn!(error = %e, "failed to fetch payout history");
                        page.error = Some("Failed to fetch payout history".into());
                        page.payout_history.clear();
                    }
                }
            }
            Vec::new()
        }
        PayoutsMessage::AccountPayoutsLoaded {
            ticket,
            account_id,
            result,
        } => {
            if page.account_payouts_guard.is_latest(ticket) {
                page.loading_account_payouts = false;
            }
            if page.account_payouts_guard.admit(ticket) {
                match result {
                    Ok(history) => {
                        page.account_payouts = payouts_for_account(&history, &account_id)
                            .cloned()
                            .collect();
                    }
                    Err(e) => {
                        warn!(error = %e, %account_id, "failed to fetch account payouts");
                        page.error = Some("Failed to fetch account payouts".into());
                        page.account_payouts.clear();
                    }
                }
            }
            Vec::new()
        }
        PayoutsMessage::PayoutCreated(result) => {
            page.submitting = false;
            match result {
                Ok(_) => {
                    page.form.clear();
                    page.success = Some("Payout created successfully".into());
                    vec![fetch_history(page)]
                }
                Err(e) => {
                    warn!(error = %e, "failed to create payout");
                    page.error = Some(format!("Failed to create payout: {}", e.user_message()));
                    Vec::new()
                }
            }
        }
        PayoutsMessage::PayoutExecuted { id, result } => {
            if page.executing_id.as_deref() == Some(id.as_str()) {
                page.executing_id = None;
            }
            match result {
                Ok(_) => page.success = Some(format!("Payout {id} executed")),
                Err(e) => {
                    warn!(error = %e, %id, "failed to execute payout");
                    page.error = Some(format!("Failed to execute payout: {}", e.user_message()));
                }
            }
            vec![fetch_history(page)]
        }
    }
}

fn report(page: &mut PayoutsPage, result: Result<(), DraftError>) {
    if let Err(e) = result {
        page.error = Some(e.to_string());
    }
}

fn fetch_accounts(page: &mut PayoutsPage) -> PayoutsAction {
    PayoutsAction::FetchAccounts(page.accounts_guard.issue())
}

fn fetch_history(page: &mut PayoutsPage) -> PayoutsAction {
    page.loading_history = true;
    PayoutsAction::FetchHistory(page.history_guard.issue())
}

fn fetch_account_payouts(page: &mut PayoutsPage, account_id: String) -> PayoutsAction {
    page.loading_account_payouts = true;
    PayoutsAction::FetchAccountPayouts {
        ticket: page.account_payouts_guard.issue(),
        account_id,
    }
}

impl Page for PayoutsPage {
    type Message = PayoutsMessage;
    type Action = PayoutsAction;

    fn update(&mut self, message: PayoutsMessage) -> Vec<PayoutsAction> {
        update(self, message)
    }

    fn perform<A: DashboardApi>(
        api: Arc<A>,
        action: PayoutsAction,
    ) -> impl Future<Output = PayoutsMessage> + Send + 'static {
        async move {
            match action {
                PayoutsAction::FetchAccounts(ticket) => PayoutsMessage::AccountsLoaded {
                    ticket,
                    result: api.list_accounts().await,
                },
                PayoutsAction::FetchHistory(ticket) => PayoutsMessage::HistoryLoaded {
                    ticket,
                    result: api.search_payouts().await,
                },
                PayoutsAction::FetchAccountPayouts { ticket, account_id } => {
                    PayoutsMessage::AccountPayoutsLoaded {
                        ticket,
                        account_id,
                        result: api.search_payouts().await,
                    }
                }
                PayoutsAction::CreatePayout(request) => {
                    PayoutsMessage::PayoutCreated(api.create_payout(request).await)
                }
                PayoutsAction::ExecutePayout(id) => {
                    let result = api.execute_payout(id.clone()).await;
                    PayoutsMessage::PayoutExecuted { id, result }
                }
            }
        }
    }

    fn failed(action: PayoutsAction, error: PaydeskError) -> PayoutsMessage {
        match action {
            PayoutsAction::FetchAccounts(ticket) => PayoutsMessage::AccountsLoaded {
                ticket,
                result: Err(error),
            },
            PayoutsAction::FetchHistory(ticket) => PayoutsMessage::HistoryLoaded {
                ticket,
                result: Err(error),
            },
            PayoutsAction::FetchAccountPayouts { ticket, account_id } => {
                PayoutsMessage::AccountPayoutsLoaded {
                    ticket,
                    account_id,
                    result: Err(error),
                }
            }
            PayoutsAction::CreatePayout(_) => PayoutsMessage::PayoutCreated(Err(error)),
            PayoutsAction::ExecutePayout(id) => PayoutsMessage::PayoutExecuted {
                id,
                result: Err(error),
            },
        }
    }
}

//! Accounts page: list accounts, create one, refetch.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::api::DashboardApi;
use super::guard::{FetchGuard, Ticket};
use super::runner::Page;
use crate::PaydeskError;
use crate::models::Account;

/// State of the accounts page.
#[derive(Debug, Default)]
pub struct AccountsPage {
    pub accounts: Vec<Account>,
    /// Text in the create-account form.
    pub new_account_name: String,
    pub creating: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    list_guard: FetchGuard,
}

impl AccountsPage {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Messages that update the accounts page.
#[derive(Debug)]
pub enum AccountsMessage {
    /// The page was opened.
    Mounted,
    NameChanged(String),
    CreateSubmitted,
    AccountsLoaded {
        ticket: Ticket,
        result: Result<Vec<Account>, PaydeskError>,
    },
    AccountCreated(Result<Value, PaydeskError>),
}

/// Proxy calls the accounts page can trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountsAction {
    FetchAccounts(Ticket),
    CreateAccount(String),
}

/// Updates the accounts page based on a message.
pub fn update(page: &mut AccountsPage, message: AccountsMessage) -> Vec<AccountsAction> {
    match message {
        AccountsMessage::Mounted => vec![fetch_accounts(page)],
        AccountsMessage::NameChanged(name) => {
            page.new_account_name = name;
            Vec::new()
        }
        AccountsMessage::CreateSubmitted => {
            if page.creating {
                return Vec::new();
            }
            page.error = None;
            page.success = None;

            let name = page.new_account_name.trim().to_string();
            if name.is_empty() {
                page.error = Some("Account name is required".into());
                return Vec::new();
            }
            page.creating = true;
            vec![AccountsAction::CreateAccount(name)]
        }
        AccountsMessage::AccountsLoaded { ticket, result } => {
            if !page.list_guard.admit(ticket) {
                return Vec::new();
            }
            match result {
                Ok(accounts) => page.accounts = accounts,
                Err(e) => {
                    warn!(error = %e, "failed to fetch accounts");
                    page.error = Some("Failed to fetch accounts".into());
                    page.accounts.clear();
                }
            }
            Vec::new()
        }
        AccountsMessage::AccountCreated(result) => {
            page.creating = false;
            match result {
                Ok(_) => {
                    page.new_account_name.clear();
                    page.success = Some("Account created successfully".into());
                    vec![fetch_accounts(page)]
                }
                Err(e) => {
                    warn!(error = %e, "failed to create account");
                    page.error = Some("Failed to create account".into());
                    Vec::new()
                }
            }
        }
    }
}

fn fetch_accounts(page: &mut AccountsPage) -> AccountsAction {
    AccountsAction::FetchAccounts(page.list_guard.issue())
}

impl Page for AccountsPage {
    type Message = AccountsMessage;
    type Action = AccountsAction;

    fn update(&mut self, message: AccountsMessage) -> Vec<AccountsAction> {
        update(self, message)
    }

    fn perform<A: DashboardApi>(
        api: Arc<A>,
        action: AccountsAction,
    ) -> impl Future<Output = AccountsMessage> + Send + 'static {
        async move {
            match action {
                AccountsAction::FetchAccounts(ticket) => AccountsMessage::AccountsLoaded {
                    ticket,
                    result: api.list_accounts().await,
                },
                AccountsAction::CreateAccount(name) => {
                    AccountsMessage::AccountCreated(api.create_account(name).await)
                }
            }
        }
    }

    fn failed(action: AccountsAction, error: PaydeskError) -> AccountsMessage {
        match action {
            AccountsAction::FetchAccounts(ticket) => AccountsMessage::AccountsLoaded {
                ticket,
                result: Err(error),
            },
            AccountsAction::CreateAccount(_) => AccountsMessage::AccountCreated(Err(error)),
        }
    }
}

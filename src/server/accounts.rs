//! Account proxy routes.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::Value;
use tracing::{error, info, warn};

use super::error::{ProxyError, require_id};
use super::payouts::INVALID_PROVIDER_JSON;
use super::state::ServerState;
use crate::models::CreateAccountRequest;
use crate::provider::{Operation, UpstreamResponse};

/// `GET /accounts-proxy`: always answers with an array.
pub async fn list_accounts(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Value>, ProxyError> {
    let upstream = state
        .provider()
        .send(Operation::ListAccounts, None)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to fetch accounts");
            ProxyError::internal("Failed to fetch accounts")
        })?;

    Ok(Json(Value::Array(normalize_account_list(&upstream))))
}

/// `POST /accounts-proxy`: forwards `{name}` and returns the provider body
/// verbatim with a 200.
pub async fn create_account(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ProxyError> {
    let Json(body) = payload.map_err(|e| ProxyError::bad_request(e.body_text()))?;

    let request = parse_create_request(&body).map_err(ProxyError::bad_request)?;

    let upstream = state
        .provider()
        .send(Operation::CreateAccount, Some(&body))
        .await
        .map_err(|e| {
            error!(error = %e, "failed to create account");
            ProxyError::internal("Failed to create account")
        })?;

    let created = upstream.json().map_err(|e| {
        error!(error = %e, "create account reply unreadable");
        ProxyError::internal("Failed to create account")
    })?;
    info!(name = %request.name, status = upstream.status.as_u16(), "account create forwarded");

    Ok(Json(created))
}

/// `GET /accounts-proxy/{id}`: returns one account verbatim.
pub async fn get_account(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let id = require_id(&id, "Account")?;

    let upstream = state
        .provider()
        .send(Operation::GetAccount(id), None)
        .await
        .map_err(|e| {
            error!(account_id = id, error = %e, "failed to fetch account");
            ProxyError::internal("Failed to fetch account")
        })?;

    upstream.json().map(Json).map_err(|e| {
        warn!(account_id = id, error = %e, "account reply unreadable");
        ProxyError::bad_gateway(INVALID_PROVIDER_JSON)
    })
}

/// Reads and validates a create-account body. Only a JSON object with a
/// non-blank string `name` is accepted.
fn parse_create_request(body: &Value) -> Result<CreateAccountRequest, String> {
    const NAME_REQUIRED: &str = "Account name is required";
    if !body.is_object() {
        return Err(NAME_REQUIRED.into());
    }
    let request: CreateAccountRequest =
        serde_json::from_value(body.clone()).map_err(|_| NAME_REQUIRED.to_string())?;
    request.validate()?;
    Ok(request)
}

/// Reduces any upstream reply to an array: non-array JSON, error shapes and
/// unparsable bodies all become `[]`.
pub fn normalize_account_list(upstream: &UpstreamResponse) -> Vec<Value> {
    match upstream.json() {
        Ok(Value::Array(accounts)) => accounts,
        Ok(_) => {
            warn!(status = upstream.status.as_u16(), "account list reply is not an array");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "account list reply unreadable");
            Vec::new()
        }
    }
}

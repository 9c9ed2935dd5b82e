//! Payout proxy routes.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use super::error::{ProxyError, require_id};
use super::state::ServerState;
use crate::provider::Operation;

pub(super) const INVALID_PROVIDER_JSON: &str = "Invalid JSON from payments provider";

#[derive(Debug, Deserialize)]
pub struct PayoutQuery {
    pub id: Option<String>,
}

/// `POST /payouts-proxy`: forwards a create-payout request verbatim.
///
/// Business-rule validation belongs to the provider; only JSON
/// well-formedness is checked here.
pub async fn create_payout(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ProxyError> {
    let Json(body) = payload.map_err(|e| ProxyError::bad_request(e.body_text()))?;

    let upstream = state
        .provider()
        .send(Operation::CreatePayout, Some(&body))
        .await
        .map_err(|e| {
            error!(error = %e, "failed to create payout");
            ProxyError::internal("Failed to create payout")
        })?;

    upstream.json().map(Json).map_err(|e| {
        warn!(error = %e, "create payout reply unreadable");
        ProxyError::bad_gateway(INVALID_PROVIDER_JSON)
    })
}

/// `GET /payouts-proxy?id=`: fetches one payout batch.
pub async fn get_payout(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PayoutQuery>,
) -> Result<Json<Value>, ProxyError> {
    let id = require_id(query.id.as_deref().unwrap_or_default(), "Payout")?;

    let upstream = state
        .provider()
        .send(Operation::GetPayout(id), None)
        .await
        .map_err(|e| {
            error!(payout_id = id, error = %e, "failed to fetch payout");
            ProxyError::internal("Failed to fetch payout")
        })?;

    upstream.json().map(Json).map_err(|e| {
        warn!(payout_id = id, error = %e, "payout reply unreadable");
        ProxyError::bad_gateway(INVALID_PROVIDER_JSON)
    })
}

/// `POST /payouts-search-proxy`: returns only the `results` of the
/// provider's `{total, results}` envelope.
pub async fn search_payouts(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Value>, ProxyError> {
    let upstream = state
        .provider()
        .send(Operation::SearchPayouts, Some(&json!({})))
        .await
        .map_err(|e| {
            error!(error = %e, "failed to fetch payout history");
            ProxyError::internal("Failed to fetch payout history")
        })?;

    if !upstream.is_success() {
        return Err(ProxyError::internal("Failed to fetch payout history")
            .with_details(upstream.details()));
    }

    let body = upstream.json().map_err(|e| {
        warn!(error = %e, "payout search reply unreadable");
        ProxyError::bad_gateway(INVALID_PROVIDER_JSON)
    })?;

    Ok(Json(Value::Array(unwrap_search_results(body))))
}

/// `POST /payouts-execute-proxy/{id}`: executes a payout with the transfer
/// credential. Success bodies pass through with the provider's status; a
/// failure status is kept but the body becomes `{error, details}`.
pub async fn execute_payout(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Value>), ProxyError> {
    let id = require_id(&id, "Payout")?;
    if state.provider().config().transfer_key.is_none() {
        error!(payout_id = id, "execute requested but MURAL_PAY_TRANSFER_KEY is not set");
        return Err(ProxyError::internal("Transfer key is not configured"));
    }

    info!(payout_id = id, "executing payout");
    let upstream = state
        .provider()
        .send(Operation::ExecutePayout(id), None)
        .await
        .map_err(|e| {
            error!(payout_id = id, error = %e, "failed to execute payout");
            ProxyError::internal("Failed to execute payout")
                .with_details(Some(Value::String(e.to_string())))
        })?;

    if !upstream.is_success() {
        warn!(payout_id = id, status = upstream.status.as_u16(), "payout execution refused");
        return Err(ProxyError::upstream(upstream.status, "Failed to execute payout")
            .with_details(upstream.details()));
    }

    let body = upstream.json().map_err(|e| {
        warn!(payout_id = id, error = %e, "execute reply unreadable");
        ProxyError::bad_gateway(INVALID_PROVIDER_JSON)
    })?;

    Ok((upstream.status, Json(body)))
}

/// `POST /payouts-execute-proxy` with no id.
pub async fn execute_payout_without_id() -> ProxyError {
    ProxyError::bad_request("Payout ID is required")
}

/// Extracts the `results` array of a search envelope; anything else is
/// `[]`. `total` is informational and never affects the result.
pub fn unwrap_search_results(mut body: Value) -> Vec<Value> {
    let total = body.get("total").cloned();
    match body.get_mut("results").map(Value::take) {
        Some(Value::Array(results)) => {
            info!(total = ?total, returned = results.len(), "payout search");
            results
        }
        _ => {
            warn!(total = ?total, "payout search reply has no results list");
            Vec::new()
        }
    }
}

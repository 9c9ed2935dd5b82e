//! HTTP surface consumed by the dashboard front end.
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | GET | `/accounts-proxy` | `Account[]`, array-normalized |
//! | POST | `/accounts-proxy` | provider account, verbatim |
//! | GET | `/accounts-proxy/{id}` | provider account, verbatim |
//! | POST | `/payouts-proxy` | provider payout, verbatim |
//! | GET | `/payouts-proxy?id=` | provider payout, verbatim |
//! | POST | `/payouts-search-proxy` | `PayoutBatch[]`, envelope-unwrapped |
//! | POST | `/payouts-execute-proxy/{id}` | provider status and body |

pub mod accounts;
pub mod error;
pub mod payouts;
pub mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::Result;
use crate::config::AppConfig;
use crate::provider::ProviderClient;

pub use error::ProxyError;
pub use state::ServerState;

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(
            "/accounts-proxy",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route("/accounts-proxy/{id}", get(accounts::get_account))
        .route(
            "/payouts-proxy",
            get(payouts::get_payout).post(payouts::create_payout),
        )
        .route("/payouts-search-proxy", post(payouts::search_payouts))
        .route(
            "/payouts-execute-proxy",
            post(payouts::execute_payout_without_id),
        )
        .route(
            "/payouts-execute-proxy/",
            post(payouts::execute_payout_without_id),
        )
        .route("/payouts-execute-proxy/{id}", post(payouts::execute_payout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves the proxy until shutdown.
///
/// # Errors
///
/// Returns [`PaydeskError::Io`](crate::PaydeskError::Io) if the listener
/// cannot be bound or the server fails, or
/// [`PaydeskError::Http`](crate::PaydeskError::Http) if the outbound client
/// cannot be built.
pub async fn serve(config: AppConfig) -> Result<()> {
    let provider = ProviderClient::new(config.provider)?;
    let state = Arc::new(ServerState::from(provider));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "paydesk proxy listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

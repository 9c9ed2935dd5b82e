//! Shared test utilities: a stub provider, in-process routing and a fake
//! dashboard API.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use paydesk::PaydeskError;
use paydesk::config::ProviderConfig;
use paydesk::dashboard::DashboardApi;
use paydesk::models::{Account, CreatePayoutRequest, PayoutBatch};
use paydesk::provider::ProviderClient;
use paydesk::server::{ServerState, router};

pub const API_KEY: &str = "test-api-key";
pub const ORG_ID: &str = "org-test";
pub const TRANSFER_KEY: &str = "test-transfer-key";

pub const ACCOUNTS_JSON: &str = include_str!("../fixtures/accounts.json");
pub const SEARCH_JSON: &str = include_str!("../fixtures/search.json");

/// Builds a provider config pointing at the stub server.
pub fn provider_config(server: &MockServer, transfer_key: Option<&str>) -> ProviderConfig {
    ProviderConfig::new(
        &server.uri(),
        API_KEY,
        ORG_ID,
        transfer_key.map(str::to_string),
    )
    .expect("valid provider config")
}

/// The proxy router wired to the stub provider.
pub fn proxy_router(server: &MockServer, transfer_key: Option<&str>) -> Router {
    let client = ProviderClient::new(provider_config(server, transfer_key))
        .expect("failed to build provider client");
    router(Arc::new(ServerState::from(client)))
}

/// Sends one request through the router and returns status and JSON body.
pub async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("proxy replied with non-JSON")
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("valid request")
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).expect("valid request")
}

/// Scripted [`DashboardApi`]: each call pops the next queued reply and is
/// recorded by name.
#[derive(Default)]
pub struct FakeApi {
    accounts: Mutex<VecDeque<Result<Vec<Account>, PaydeskError>>>,
    history: Mutex<VecDeque<Result<Vec<PayoutBatch>, PaydeskError>>>,
    writes: Mutex<VecDeque<Result<Value, PaydeskError>>>,
    calls: Mutex<Vec<String>>,
    created_payouts: Mutex<Vec<CreatePayoutRequest>>,
    panic_on_execute: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_accounts(&self, reply: Result<Vec<Account>, PaydeskError>) {
        self.accounts.lock().unwrap().push_back(reply);
    }

    pub fn push_history(&self, reply: Result<Vec<PayoutBatch>, PaydeskError>) {
        self.history.lock().unwrap().push_back(reply);
    }

    /// Queues the reply for the next create or execute call.
    pub fn push_write(&self, reply: Result<Value, PaydeskError>) {
        self.writes.lock().unwrap().push_back(reply);
    }

    /// Makes the next execute call panic instead of replying.
    pub fn panic_on_execute(&self) {
        self.panic_on_execute.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_payouts(&self) -> Vec<CreatePayoutRequest> {
        self.created_payouts.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_write(&self) -> Result<Value, PaydeskError> {
        self.writes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Value::Null))
    }
}

impl DashboardApi for FakeApi {
    async fn list_accounts(&self) -> paydesk::Result<Vec<Account>> {
        self.record("list_accounts".into());
        self.accounts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn create_account(&self, name: String) -> paydesk::Result<Value> {
        self.record(format!("create_account:{name}"));
        self.next_write()
    }

    async fn search_payouts(&self) -> paydesk::Result<Vec<PayoutBatch>> {
        self.record("search_payouts".into());
        self.history
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn create_payout(&self, request: CreatePayoutRequest) -> paydesk::Result<Value> {
        self.record("create_payout".into());
        self.created_payouts.lock().unwrap().push(request);
        self.next_write()
    }

    async fn execute_payout(&self, id: String) -> paydesk::Result<Value> {
        self.record(format!("execute_payout:{id}"));
        if self.panic_on_execute.swap(false, Ordering::SeqCst) {
            panic!("execute handler crashed");
        }
        self.next_write()
    }
}

pub fn fixture_accounts() -> Vec<Account> {
    serde_json::from_str(ACCOUNTS_JSON).expect("accounts fixture parses")
}

pub fn fixture_history() -> Vec<PayoutBatch> {
    let envelope: Value = serde_json::from_str(SEARCH_JSON).expect("search fixture parses");
    serde_json::from_value(envelope["results"].clone()).expect("search results parse")
}

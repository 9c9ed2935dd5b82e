//! Full stack: dashboard controller -> proxy over HTTP -> stub provider.

mod common;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use paydesk::PaydeskError;
use paydesk::dashboard::{
    AccountsMessage, AccountsPage, DashboardApi, HttpDashboardApi, PageRunner,
};

use common::{SEARCH_JSON, TRANSFER_KEY, proxy_router};

/// Serves the proxy on an ephemeral port and returns its base URL.
async fn spawn_proxy(provider: &MockServer) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("local addr");
    let app = proxy_router(provider, Some(TRANSFER_KEY));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("proxy server failed");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn accounts_page_round_trip() {
    let provider = MockServer::start().await;
    let created = json!({"id": "a1", "name": "Ops", "status": "PENDING"});
    Mock::given(method("GET"))
        .and(path("/api/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&provider)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/accounts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(created.clone()))
        .expect(1)
        .mount(&provider)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([created])))
        .mount(&provider)
        .await;

    let proxy = spawn_proxy(&provider).await;
    let api = Arc::new(HttpDashboardApi::new(&proxy).unwrap());

    let mut runner = PageRunner::new(AccountsPage::new(), api);
    runner.dispatch(AccountsMessage::Mounted);
    runner.settle().await;
    assert!(runner.page().accounts.is_empty());
    assert!(runner.page().error.is_none());

    runner.dispatch(AccountsMessage::NameChanged("Ops".into()));
    runner.dispatch(AccountsMessage::CreateSubmitted);
    runner.settle().await;

    let page = runner.page();
    assert!(page.error.is_none(), "unexpected error {:?}", page.error);
    assert_eq!(page.accounts.len(), 1);
    assert_eq!(page.accounts[0].id, "a1");
    assert!(page.accounts[0].account_details.is_none());
}

#[tokio::test]
async fn http_api_reads_unwrapped_history() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payouts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_JSON))
        .mount(&provider)
        .await;

    let proxy = spawn_proxy(&provider).await;
    let api = HttpDashboardApi::new(&proxy).unwrap();

    let history = api.search_payouts().await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].status.is_actionable());
    assert_eq!(history[0].payouts[0].id, "l1");
}

#[tokio::test]
async fn http_api_treats_error_status_as_failure() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/payouts/payout/p1/execute"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "not executable"})))
        .expect(1)
        .mount(&provider)
        .await;

    let proxy = spawn_proxy(&provider).await;
    let api = HttpDashboardApi::new(&proxy).unwrap();

    let err = api.execute_payout("p1".into()).await.unwrap_err();
    assert!(
        matches!(
            &err,
            PaydeskError::Upstream { status: 400, details: Some(d) } if d == "not executable"
        ),
        "unexpected error {err:?}"
    );
    assert_eq!(err.user_message(), "not executable");
}

#[tokio::test]
async fn http_api_keeps_readable_accounts_when_one_is_malformed() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a1", "name": "Ops", "status": "ACTIVE", "isApiEnabled": true},
            {"id": "a2", "name": null, "status": "PENDING"},
            {"id": "a3", "name": "Payroll", "status": "PENDING"}
        ])))
        .mount(&provider)
        .await;

    let proxy = spawn_proxy(&provider).await;
    let api = HttpDashboardApi::new(&proxy).unwrap();

    let accounts = api.list_accounts().await.unwrap();
    let ids: Vec<_> = accounts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["a1", "a3"]);
}

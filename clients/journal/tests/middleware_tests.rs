//! Web front-end tests: routes and the Content-Security-Policy header.

use axum::{
    body::Body,
    http::{header::CONTENT_SECURITY_POLICY, Request, StatusCode},
    response::Response,
};
use journal_client::middleware::CSP_POLICY;
use journal_client::{server, Cluster, JournalClient, JournalEntryState, MemoryLedger};
use solana_sdk::{
    account::Account,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::sync::Arc;
use tower::ServiceExt;

// =============================================================================
// TEST SETUP HELPERS
// =============================================================================

fn app_with_ledger() -> (axum::Router, Arc<MemoryLedger>, Pubkey) {
    let ledger = Arc::new(MemoryLedger::new(journal_client::id()));
    let wallet = Keypair::new();
    let owner = wallet.pubkey();
    ledger.airdrop(&owner, 2_500_000_000);

    let client = JournalClient::new(Cluster::Localnet, ledger.clone(), Arc::new(wallet));
    (server::router(Arc::new(client)), ledger, owner)
}

async fn get(path: &str) -> Response {
    let (app, _, _) = app_with_ledger();
    app.oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn csp_values(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(CONTENT_SECURITY_POLICY)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// CSP HEADER TESTS
// =============================================================================

#[tokio::test]
async fn test_pages_carry_exactly_one_policy() {
    for path in ["/", "/journal"] {
        let response = get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        assert_eq!(csp_values(&response), vec![CSP_POLICY.to_string()], "{path}");
    }
}

#[tokio::test]
async fn test_unknown_page_still_gets_policy() {
    let response = get("/settings").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(csp_values(&response).len(), 1);
}

#[tokio::test]
async fn test_excluded_paths_have_no_policy() {
    for path in [
        "/api/entries",
        "/api/foo",
        "/_next/static/chunks/app.js",
        "/favicon.ico",
        "/image.png",
    ] {
        let response = get(path).await;
        assert!(csp_values(&response).is_empty(), "{path} should not carry CSP");
    }
}

// =============================================================================
// ROUTE TESTS
// =============================================================================

#[tokio::test]
async fn test_entries_json() {
    let (app, ledger, owner) = app_with_ledger();
    let data = JournalEntryState {
        owner,
        title: "<script>".to_string(),
        message: "escaped".to_string(),
    }
    .pack()
    .unwrap();
    ledger.insert_account(
        Pubkey::new_unique(),
        Account {
            lamports: 10_000_000,
            data,
            owner: journal_client::id(),
            executable: false,
            rent_epoch: 0,
        },
    );

    let response = app
        .clone()
        .oneshot(Request::get("/api/entries").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "<script>");
    assert_eq!(entries[0]["owner"], owner.to_string());

    let page = app
        .oneshot(Request::get("/journal").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let html = body_text(page).await;
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn test_balance_json() {
    let (app, _, owner) = app_with_ledger();
    let response = app
        .oneshot(Request::get("/api/balance").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["wallet"], owner.to_string());
    assert_eq!(json["lamports"], 2_500_000_000u64);
    assert_eq!(json["sol"], 2.5);
}

//! Web Front-End
//!
//! A small axum application over a shared [`JournalClient`]:
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /`, `GET /journal` | entry list (HTML) |
//! | `GET /api/entries` | entry list (JSON) |
//! | `GET /api/balance` | wallet balance (JSON) |
//!
//! Page responses carry the CSP header; `/api/*` does not.

use crate::client::{EntryRecord, JournalClient};
use crate::error::{JournalError, JournalResult};
use crate::middleware::CspLayer;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use solana_sdk::native_token::lamports_to_sol;
use std::fmt::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared handler state.
pub type AppState = Arc<JournalClient>;

/// JSON shape of one entry.
#[derive(Debug, Serialize)]
pub struct EntryView {
    pub address: String,
    pub owner: String,
    pub title: String,
    pub message: String,
}

impl From<&EntryRecord> for EntryView {
    fn from(record: &EntryRecord) -> Self {
        Self {
            address: record.address.to_string(),
            owner: record.state.owner.to_string(),
            title: record.state.title.clone(),
            message: record.state.message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceView {
    pub wallet: String,
    pub lamports: u64,
    pub sol: f64,
}

/// Build the router. Layer order: Request → Trace → Csp → Handler.
pub fn router(client: AppState) -> Router {
    Router::new()
        .route("/", get(journal_page))
        .route("/journal", get(journal_page))
        .route("/api/entries", get(entries_json))
        .route("/api/balance", get(balance_json))
        .fallback(not_found)
        .layer(CspLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(client)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, client: AppState) -> JournalResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, cluster = %client.cluster(), "journal web front-end listening");
    axum::serve(listener, router(client)).await?;
    Ok(())
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn journal_page(State(client): State<AppState>) -> Result<Html<String>, ApiError> {
    let entries = client.list_entries().await?;

    let mut body = format!(
        "<h1>Journal</h1>\n<p>Cluster: {} &middot; Wallet: <code>{}</code></p>\n",
        escape_html(client.cluster().name()),
        client.wallet_pubkey(),
    );
    if entries.is_empty() {
        body.push_str("<p>No entries yet.</p>\n");
    }
    for record in &entries {
        let _ = write!(
            body,
            "<article>\n<h2>{}</h2>\n<p>{}</p>\n<small>{}</small>\n</article>\n",
            escape_html(&record.state.title),
            escape_html(&record.state.message),
            record.state.owner,
        );
    }
    Ok(Html(page("Journal", &body)))
}

async fn entries_json(State(client): State<AppState>) -> Result<Json<Vec<EntryView>>, ApiError> {
    let entries = client.list_entries().await?;
    Ok(Json(entries.iter().map(EntryView::from).collect()))
}

async fn balance_json(State(client): State<AppState>) -> Result<Json<BalanceView>, ApiError> {
    let lamports = client.balance().await?;
    Ok(Json(BalanceView {
        wallet: client.wallet_pubkey().to_string(),
        lamports,
        sol: lamports_to_sol(lamports),
    }))
}

async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(page("Not found", "<h1>Not found</h1>")),
    )
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Handler error: the client error as a JSON body.
pub struct ApiError(JournalError);

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            JournalError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            JournalError::Rpc(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"hi\" & 'bye'</b>"),
            "&lt;b&gt;&quot;hi&quot; &amp; &#39;bye&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}

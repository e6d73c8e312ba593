//! HTTP server lifecycle and router construction.

use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use super::pagination;
use crate::cache::PoolCache;

/// Stats server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address to bind the stats server to. Defaults to "127.0.0.1:8080".
    pub bind_addr: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Shared application state available to all handlers.
#[derive(Clone)]
pub(crate) struct SharedState {
    pub cache: Arc<PoolCache>,
}

/// Start the stats server.
///
/// Runs until the provided cancellation token is triggered. The cache is
/// updated by producers elsewhere; handlers only read snapshots from it.
pub async fn serve(config: ApiConfig, shutdown: CancellationToken, cache: Arc<PoolCache>) -> Result<()> {
    let app = build_router(cache);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    let actual_addr = listener.local_addr()?;

    info!(url = %format!("http://{}", actual_addr), "Stats server listening.");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await?;

    Ok(())
}

/// Build the application router with all stats routes.
pub(crate) fn build_router(cache: Arc<PoolCache>) -> Router {
    let state = SharedState { cache };

    Router::new()
        .route("/blocks", get(pagination::blocks))
        .route("/rewardquotas", get(pagination::reward_quotas))
        .route("/account/{account_id}/blocks", get(pagination::blocks_by_account))
        .route(
            "/account/{account_id}/clients",
            get(pagination::clients_by_account),
        )
        .route(
            "/account/{account_id}/payments/pending",
            get(pagination::pending_payments_by_account),
        )
        .route(
            "/account/{account_id}/payments/archived",
            get(pagination::archived_payments_by_account),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

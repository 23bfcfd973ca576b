//! Web server adapter.
//!
//! JSON API over the summary pipeline for a browser front end:
//!
//! - `GET /api/health`
//! - `GET /api/predict?symbol=AAPL&start=2023-01-01`

mod error;
mod handlers;

pub use error::{status_for_summary, WebError};
pub use handlers::*;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ports::data_port::DataPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";

pub struct AppState {
    pub data_port: Arc<dyn DataPort + Send + Sync>,
}

pub fn build_router(state: AppState, permissive_cors: bool) -> Router {
    let router = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/predict", get(handlers::predict))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state));

    if permissive_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

pub async fn serve(router: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "stockcast listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

//! HTTP server.
//!
//! This module provides:
//! - The axum router and shared state (`router`, `AppState`)
//! - Route handlers (`handlers`)
//! - Error-to-response mapping (`error`)
//! - Configuration types (`config`)

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::net::TcpListener;

use crate::service::InferenceService;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InferenceService>,
}

impl AppState {
    pub fn new(service: Arc<InferenceService>) -> Self {
        Self { service }
    }
}

/// Build the application router.
///
/// `max_upload_bytes` caps every request body, spreadsheet uploads included.
pub fn router(service: Arc<InferenceService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/predict-batch", post(handlers::predict_batch))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(AppState::new(service))
}

/// Serve `router` on `listener` until ctrl-c.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // never resolve; keep serving
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

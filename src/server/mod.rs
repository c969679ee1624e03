//! HTTP service exposing the overrun predictor.
//!
//! `POST /predict` takes a [`ProjectInput`](crate::predict::ProjectInput)
//! and answers with a [`PredictionOutput`](crate::predict::PredictionOutput).
//! Malformed bodies are rejected by the JSON extractor before any handler
//! runs.

mod handlers;
mod state;

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use thiserror::Error;
use tower_http::cors::CorsLayer;

pub use handlers::{ErrorResponse, HealthResponse};
pub use state::AppState;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the service router; `cors` enables a permissive CORS layer.
pub fn router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .with_state(state);
    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState, cors: bool) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!(addr = %listener.local_addr()?, cors, "Overrun service listening");
    axum::serve(listener, router(state, cors))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Overrun service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}

//! support-api - HTTP surface for the support chatbot
//!
//! A thin axum layer over [`support_bot::Chatbot`]:
//!
//! - `POST /api/v1/query` answers a question, threading session history.
//! - `GET /health` reports `ok` or `degraded`.
//! - `POST /api/v1/session` / `GET /api/v1/session/{id}` manage sessions.
//!
//! The chatbot may fail to construct; the server still runs and reports the
//! failure through health checks and a 503 on queries.

mod error;
mod handlers;
mod router;
mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::{AppState, BotState};

use std::sync::Arc;

use tracing::info;

use support_core::{Result, SupportError};

/// Bind and serve the HTTP API until the process is stopped.
pub async fn serve(state: Arc<AppState>, bind_address: &str) -> Result<()> {
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| SupportError::config(format!("Failed to bind {}: {}", bind_address, e)))?;

    info!("Listening on {}", bind_address);

    axum::serve(listener, router)
        .await
        .map_err(SupportError::Io)?;

    Ok(())
}

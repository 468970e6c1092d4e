// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes and shared state. Non-POST requests to the webhook
//! route get a 405 from axum's method routing.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use courier_core::CourierError;
use courier_media::{ContentStore, UrlSigner};
use courier_relay::Relay;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The relay orchestrator handling webhook payloads.
    pub relay: Arc<Relay>,
    /// Content store backing the media route.
    pub store: ContentStore,
    /// URL signer; `None` disables media retrieval entirely.
    pub signer: Option<UrlSigner>,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

/// Build the gateway router. Separate from [`start_server`] so tests can
/// drive it without binding a socket.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/webhook/whatsapp", post(handlers::post_webhook))
        .route("/media/{user_id}/{file}", get(handlers::get_media))
        .route("/health", get(handlers::get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server on the configured host and port.
pub async fn start_server(host: &str, port: u16, state: GatewayState) -> Result<(), CourierError> {
    let app = router(state);
    let addr = format!("{host}:{port}");
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| CourierError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| CourierError::Internal(format!("gateway server error: {e}")))
}

// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the relay gateway.
//!
//! Handles POST /webhook/whatsapp, GET /media/{user_id}/{file},
//! GET /health.

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use courier_carrier::{twiml, webhook};
use courier_media::store::content_type_for;
use courier_relay::RelayOutcome;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::server::GatewayState;

/// Ack text for an error that escaped every degraded path. Still 200.
const GLITCH_TEXT: &str = "Hmm, something glitched on my end. Mind sending that again?";

fn twiml_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, twiml::CONTENT_TYPE)], body).into_response()
}

/// POST /webhook/whatsapp
///
/// Accepts form-encoded or JSON payloads and always answers 200 with a
/// TwiML envelope; the carrier retries anything that looks like failure.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let payload = if content_type.starts_with("application/json") {
        match serde_json::from_slice(&body) {
            Ok(value) => webhook::parse_json(&value),
            Err(error) => {
                warn!(%error, "unparseable JSON webhook body");
                return twiml_response(twiml::empty());
            }
        }
    } else {
        match serde_urlencoded::from_bytes::<HashMap<String, String>>(&body) {
            Ok(fields) => webhook::parse_form(&fields),
            Err(error) => {
                warn!(%error, "unparseable form webhook body");
                return twiml_response(twiml::empty());
            }
        }
    };

    let envelope = match state.relay.handle_inbound(payload).await {
        Ok(RelayOutcome::Ignored) | Ok(RelayOutcome::Deferred) => twiml::empty(),
        Ok(RelayOutcome::Help(text)) | Ok(RelayOutcome::Replied(text)) => twiml::message(&text),
        Err(error) => {
            error!(%error, "unhandled relay error, sending glitch ack");
            twiml::message(GLITCH_TEXT)
        }
    };
    twiml_response(envelope)
}

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    #[serde(default)]
    expires: Option<i64>,
    #[serde(default)]
    sig: Option<String>,
}

/// GET /media/{user_id}/{file}
///
/// Serves a stored attachment when the signature checks out and the URL
/// has not expired. 403 on a bad or expired signature, 404 otherwise.
pub async fn get_media(
    State(state): State<GatewayState>,
    Path((user_id, file)): Path<(String, String)>,
    Query(query): Query<MediaQuery>,
) -> Response {
    let Some(signer) = &state.signer else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let (Some(expires), Some(sig)) = (query.expires, query.sig.as_deref()) else {
        return StatusCode::FORBIDDEN.into_response();
    };
    if !signer.verify(&user_id, &file, expires, sig) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let Some(path) = state.store.resolve(&user_id, &file) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, content_type_for(&file))],
            bytes,
        )
            .into_response(),
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to read stored media");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health, unauthenticated.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

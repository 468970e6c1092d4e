// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The relay state machine.
//!
//! Each inbound webhook payload walks PARSE, IDENTIFY, FILTER_PRIVATE,
//! INGEST_MEDIA, SNAPSHOT_CONTEXT, PERSIST, CHECK_PRESENCE and ends in
//! one of the [`RelayOutcome`] acks. The carrier-facing response must
//! always look like success, so every recoverable failure degrades in
//! place and only identity or message persistence errors escape to the
//! gateway's glitch handler.

use std::sync::Arc;

use chrono::{Duration, Utc};
use courier_config::model::CourierConfig;
use courier_core::error::CourierError;
use courier_core::traits::{CarrierClient, StorageAdapter};
use courier_core::types::{
    CHANNEL_WHATSAPP, DeliveryStatus, Direction, InboundPayload, SOURCE_FALLBACK, StoredMessage,
    Visibility,
};
use courier_fallback::FallbackResponder;
use courier_media::MediaIngestor;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::compress_context;
use crate::identity;
use crate::identity::resolve_identity;
use crate::presence::is_live;
use crate::tasks::enqueue_followup;

/// Case-insensitive marker that flips a single message to private.
const PRIVATE_MARKER: &str = "private:";

/// Help ack for messages with no text and no attachments.
pub const DEFAULT_HELP_TEXT: &str = "Hi! I didn't catch a message there. Send me a text \
and I'll pass it along, or start with \"private:\" to keep it just between us.";

/// Terminal ack of one webhook invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    /// Malformed sender; empty envelope, no side effects.
    Ignored,
    /// Empty message; fixed help text, identity resolved but nothing stored.
    Help(String),
    /// Local agent is live and will answer out-of-band; empty envelope.
    Deferred,
    /// Local agent offline; fallback reply delivered in the envelope.
    Replied(String),
}

/// Tunables the orchestrator reads from the merged config.
#[derive(Debug, Clone)]
pub struct RelayOptions {
    pub help_text: String,
    pub history_window: i64,
    pub line_max_chars: usize,
    pub liveness_window: Duration,
}

impl RelayOptions {
    pub fn from_config(config: &CourierConfig) -> Self {
        let mut help_text = config
            .relay
            .help_text
            .clone()
            .unwrap_or_else(|| DEFAULT_HELP_TEXT.to_string());
        if let Some(words) = config
            .carrier
            .sandbox_join_words
            .as_deref()
            .filter(|w| !w.trim().is_empty())
        {
            help_text.push_str(&format!(
                " If you haven't joined yet, text \"join {}\" first.",
                words.trim()
            ));
        }
        Self {
            help_text,
            history_window: config.context.history_window,
            line_max_chars: config.context.line_max_chars,
            liveness_window: Duration::seconds(config.presence.liveness_window_secs as i64),
        }
    }
}

/// Orchestrator over injected adapter objects. One instance serves the
/// whole process; invocations share no mutable state.
pub struct Relay {
    storage: Arc<dyn StorageAdapter>,
    carrier: Arc<dyn CarrierClient>,
    responder: FallbackResponder,
    ingestor: Option<MediaIngestor>,
    options: RelayOptions,
}

impl Relay {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        carrier: Arc<dyn CarrierClient>,
        responder: FallbackResponder,
        ingestor: Option<MediaIngestor>,
        options: RelayOptions,
    ) -> Self {
        Self {
            storage,
            carrier,
            responder,
            ingestor,
            options,
        }
    }

    /// Run one inbound payload through the state machine.
    ///
    /// Returns `Err` only for failures with no degraded continuation
    /// (identity resolution, inbound persist); the gateway converts those
    /// into the generic glitch ack, still HTTP 200.
    pub async fn handle_inbound(
        &self,
        payload: InboundPayload,
    ) -> Result<RelayOutcome, CourierError> {
        // PARSE
        // A sender with no digits would otherwise persist a user with an
        // empty channel identity.
        if identity::normalize_phone(&payload.sender).is_empty() {
            debug!("inbound payload without a usable sender, ignoring");
            return Ok(RelayOutcome::Ignored);
        }

        // IDENTIFY
        let user = resolve_identity(
            self.storage.as_ref(),
            &payload.sender,
            payload.profile_name.as_deref(),
        )
        .await?;

        // FILTER_PRIVATE
        let body = payload.body.trim();
        let marker = body
            .get(..PRIVATE_MARKER.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(PRIVATE_MARKER));
        let (body, visibility) = if marker {
            (body[PRIVATE_MARKER.len()..].trim_start(), Visibility::Private)
        } else if user.private_mode_default {
            (body, Visibility::Private)
        } else {
            (body, Visibility::Visible)
        };

        if body.is_empty() && payload.media.is_empty() {
            info!(user_id = user.id, "empty inbound message, sending help text");
            return Ok(RelayOutcome::Help(self.options.help_text.clone()));
        }

        // INGEST_MEDIA
        let stored_media = match (&self.ingestor, payload.media.is_empty()) {
            (Some(ingestor), false) => ingestor.ingest(&user.id, &payload.media).await,
            (None, false) => {
                warn!(
                    user_id = user.id,
                    count = payload.media.len(),
                    "media ingestion not configured, dropping attachments"
                );
                Vec::new()
            }
            _ => Vec::new(),
        };

        // SNAPSHOT_CONTEXT, before the current turn is persisted.
        let history = match self
            .storage
            .recent_turns(&user.id, self.options.history_window)
            .await
        {
            Ok(turns) => turns,
            Err(error) => {
                warn!(user_id = user.id, %error, "history read failed, continuing without context");
                Vec::new()
            }
        };
        let snapshot = compress_context(
            &history,
            self.options.history_window as usize,
            self.options.line_max_chars,
        );

        // PERSIST
        let inbound = StoredMessage {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            direction: Direction::Inbound,
            content: body.to_string(),
            channel: CHANNEL_WHATSAPP.to_string(),
            carrier_message_id: payload.carrier_message_id.clone(),
            status: DeliveryStatus::Sent,
            visibility,
            needs_response: true,
            context_snapshot: snapshot.clone(),
            media: stored_media.clone(),
            source: None,
            delivery_error: None,
            created_at: Utc::now().to_rfc3339(),
        };
        self.storage.insert_message(&inbound).await?;

        // Best-effort typing indicator on both branches.
        if let Err(error) = self.carrier.send_typing(&user.channel_identity).await {
            debug!(user_id = user.id, %error, "typing indicator failed");
        }

        // CHECK_PRESENCE
        if is_live(
            self.storage.as_ref(),
            &user.id,
            Utc::now(),
            self.options.liveness_window,
        )
        .await
        {
            info!(
                user_id = user.id,
                media = stored_media.len(),
                "agent live, deferring to local agent"
            );
            return Ok(RelayOutcome::Deferred);
        }

        // RESPOND_OFFLINE
        let reply = self
            .responder
            .respond(&user, body, &history, &stored_media)
            .await;

        // The TwiML ack itself delivers the reply, so the outbound row is
        // recorded as already sent and the dispatcher leaves it alone.
        let outbound = StoredMessage {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            direction: Direction::Outbound,
            content: reply.clone(),
            channel: CHANNEL_WHATSAPP.to_string(),
            carrier_message_id: None,
            status: DeliveryStatus::Sent,
            visibility: Visibility::Visible,
            needs_response: false,
            context_snapshot: None,
            media: Vec::new(),
            source: Some(SOURCE_FALLBACK.to_string()),
            delivery_error: None,
            created_at: Utc::now().to_rfc3339(),
        };
        if let Err(error) = self.storage.insert_message(&outbound).await {
            warn!(user_id = user.id, %error, "failed to persist fallback reply");
        }

        enqueue_followup(
            self.storage.as_ref(),
            &user.id,
            body,
            &reply,
            snapshot,
            !stored_media.is_empty(),
        )
        .await;

        info!(
            user_id = user.id,
            media = stored_media.len(),
            reply_chars = reply.chars().count(),
            "agent offline, replied via fallback"
        );
        Ok(RelayOutcome::Replied(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_text_defaults_without_join_words() {
        let config = CourierConfig::default();
        let options = RelayOptions::from_config(&config);
        assert_eq!(options.help_text, DEFAULT_HELP_TEXT);
    }

    #[test]
    fn join_words_are_appended_to_help_text() {
        let mut config = CourierConfig::default();
        config.carrier.sandbox_join_words = Some("amber-fox".to_string());
        let options = RelayOptions::from_config(&config);
        assert!(options.help_text.starts_with(DEFAULT_HELP_TEXT));
        assert!(options.help_text.contains("join amber-fox"));
    }

    #[test]
    fn blank_join_words_leave_help_text_alone() {
        let mut config = CourierConfig::default();
        config.carrier.sandbox_join_words = Some("   ".to_string());
        let options = RelayOptions::from_config(&config);
        assert_eq!(options.help_text, DEFAULT_HELP_TEXT);
    }
}

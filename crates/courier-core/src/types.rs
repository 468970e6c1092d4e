// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Courier workspace.
//!
//! Timestamps are stored as RFC 3339 strings throughout; SQLite has no
//! native datetime type and string comparison preserves chronological order.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Channel tag for messages relayed through the WhatsApp carrier.
pub const CHANNEL_WHATSAPP: &str = "whatsapp_carrier";

/// Source tag for outbound messages authored by the cloud fallback.
pub const SOURCE_FALLBACK: &str = "fallback";

/// Direction of a stored message relative to the user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Delivery status of a stored message.
///
/// Append-only discipline: `content` never changes after insert; only the
/// status (and `delivery_error`) may be rewritten by the dispatcher.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Error,
}

/// Message visibility, derived from a per-message prefix or the user's default.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Visible,
}

/// Presence state reported by the user's local agent process.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    Online,
    Busy,
    Offline,
}

/// A durable user identity, created on first inbound contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier assigned at creation.
    pub id: String,
    /// Normalized phone number (digits only, with country code). Unique.
    pub channel_identity: String,
    /// Display name captured from the carrier profile, if any.
    pub first_name: Option<String>,
    /// Default visibility for messages without an explicit prefix.
    pub private_mode_default: bool,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// A carrier-hosted attachment reference from an inbound webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// Carrier-hosted URL requiring service credentials to fetch.
    pub url: String,
    /// Content type declared by the carrier.
    pub content_type: String,
}

/// A republished attachment with a stable, signed, time-limited URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMedia {
    /// Signed retrieval URL served by the gateway.
    pub url: String,
    /// Content type of the stored bytes.
    pub content_type: String,
}

/// A message in the append-only conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub user_id: String,
    pub direction: Direction,
    /// Text content; may be empty for media-only messages.
    pub content: String,
    /// Originating or destination channel (e.g. [`CHANNEL_WHATSAPP`]).
    pub channel: String,
    /// Carrier-assigned message id, kept for audit only (no dedup).
    pub carrier_message_id: Option<String>,
    pub status: DeliveryStatus,
    pub visibility: Visibility,
    /// True only for inbound messages still awaiting an agent reply.
    pub needs_response: bool,
    /// Compressed conversation context captured at ingestion time. Immutable.
    pub context_snapshot: Option<String>,
    /// Republished attachments, if any.
    pub media: Vec<StoredMedia>,
    /// Authoring source for outbound messages (e.g. [`SOURCE_FALLBACK`]).
    pub source: Option<String>,
    /// Carrier error text recorded by the dispatcher on send failure.
    pub delivery_error: Option<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Heartbeat state of a user's local agent. One row per user.
///
/// Written by the external local-agent collaborator; read-only to this
/// subsystem outside of tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub user_id: String,
    pub state: PresenceState,
    /// RFC 3339 timestamp of the most recent heartbeat.
    pub last_heartbeat_at: String,
}

/// Task kind for cloud-answered turns the local agent must reconcile.
pub const TASK_KIND_CHANNEL_FOLLOWUP: &str = "channel_followup";

/// Status of a pending task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Resolved,
}

/// A durable marker instructing the local agent to follow up on a turn
/// the cloud fallback answered provisionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTask {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub original_message: String,
    pub provisional_response: String,
    pub context_snapshot: Option<String>,
    pub has_media: bool,
    pub status: TaskStatus,
    pub created_at: String,
}

/// A validated inbound webhook payload.
///
/// Produced by the carrier webhook parser at the boundary; all downstream
/// code operates on this struct, never on raw key-value maps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InboundPayload {
    /// Raw sender identity as supplied by the carrier (may be empty).
    pub sender: String,
    /// Text body (may be empty for media-only messages).
    pub body: String,
    /// Carrier message id, for audit.
    pub carrier_message_id: Option<String>,
    /// Sender display name from the carrier profile.
    pub profile_name: Option<String>,
    /// Attachment references.
    pub media: Vec<MediaAttachment>,
}

/// A single turn of recent history, reduced for context compression.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnSummary {
    pub direction: Direction,
    pub content: String,
}

/// Content within a completion chat turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatContent {
    /// Plain text content.
    Text(String),
    /// An image reachable at a (signed) URL, inlined into the prompt.
    ImageUrl(String),
}

/// A single turn in a completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    /// Role: "user" or "assistant".
    pub role: String,
    pub content: Vec<ChatContent>,
}

impl ChatTurn {
    /// Convenience constructor for a plain-text turn.
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: vec![ChatContent::Text(text.into())],
        }
    }
}

/// A request to a chat-completion model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub turns: Vec<ChatTurn>,
    pub max_tokens: u32,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Carrier,
    Completion,
    UserContext,
}

// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Courier relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Courier configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CourierConfig {
    /// Relay identity and behavior settings.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Carrier (Twilio-style) delivery API settings.
    #[serde(default)]
    pub carrier: CarrierConfig,

    /// Fallback completion model settings.
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Local-agent presence liveness settings.
    #[serde(default)]
    pub presence: PresenceConfig,

    /// Media ingestion and signed-URL settings.
    #[serde(default)]
    pub media: MediaConfig,

    /// Conversation context compression settings.
    #[serde(default)]
    pub context: ContextConfig,

    /// Gateway HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Outbound dispatcher settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Relay identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Display name of the relay's assistant persona.
    #[serde(default = "default_relay_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Character budget the fallback responder is asked to stay under.
    #[serde(default = "default_reply_char_budget")]
    pub reply_char_budget: usize,

    /// Override for the help text returned on empty inbound messages.
    #[serde(default)]
    pub help_text: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            name: default_relay_name(),
            log_level: default_log_level(),
            reply_char_budget: default_reply_char_budget(),
            help_text: None,
        }
    }
}

fn default_relay_name() -> String {
    "courier".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_reply_char_budget() -> usize {
    600
}

/// Carrier delivery API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CarrierConfig {
    /// Carrier account SID. `None` disables outbound delivery.
    #[serde(default)]
    pub account_sid: Option<String>,

    /// Carrier auth token.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// The relay's own WhatsApp number (E.164, no `whatsapp:` prefix).
    #[serde(default)]
    pub whatsapp_number: Option<String>,

    /// Sandbox join words, surfaced in the help text when set.
    #[serde(default)]
    pub sandbox_join_words: Option<String>,

    /// Base URL of the carrier REST API.
    #[serde(default = "default_carrier_base_url")]
    pub base_url: String,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            whatsapp_number: None,
            sandbox_join_words: None,
            base_url: default_carrier_base_url(),
        }
    }
}

fn default_carrier_base_url() -> String {
    "https://api.twilio.com".to_string()
}

/// Fallback completion model configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackConfig {
    /// API key for the completion endpoint. `None` requires env override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier for fallback replies.
    #[serde(default = "default_fallback_model")]
    pub model: String,

    /// Maximum tokens to generate per fallback reply.
    #[serde(default = "default_fallback_max_tokens")]
    pub max_tokens: u32,

    /// Base URL of the chat-completion API.
    #[serde(default = "default_fallback_base_url")]
    pub base_url: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_fallback_model(),
            max_tokens: default_fallback_max_tokens(),
            base_url: default_fallback_base_url(),
        }
    }
}

fn default_fallback_model() -> String {
    "gpt-4o".to_string()
}

fn default_fallback_max_tokens() -> u32 {
    400
}

fn default_fallback_base_url() -> String {
    "https://api.openai.com".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("courier").join("courier.db"))
        .and_then(|p| p.to_str().map(|s| s.to_string()))
        .unwrap_or_else(|| "courier.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Local-agent presence liveness configuration.
///
/// The window and cadence were fixed constants in earlier designs; they are
/// deliberately configurable here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PresenceConfig {
    /// A heartbeat older than this many seconds counts as offline.
    #[serde(default = "default_liveness_window_secs")]
    pub liveness_window_secs: u64,

    /// Expected heartbeat cadence of the local agent, in seconds.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            liveness_window_secs: default_liveness_window_secs(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
        }
    }
}

fn default_liveness_window_secs() -> u64 {
    300
}

fn default_heartbeat_interval_secs() -> u64 {
    120
}

/// Media ingestion and signed-URL configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Root directory of the content store.
    #[serde(default = "default_content_root")]
    pub content_root: String,

    /// Public base URL under which the gateway serves stored media.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// HMAC signing key for retrieval URLs.
    #[serde(default)]
    pub signing_key: Option<String>,

    /// Days a minted retrieval URL stays valid.
    #[serde(default = "default_url_ttl_days")]
    pub url_ttl_days: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            public_base_url: default_public_base_url(),
            signing_key: None,
            url_ttl_days: default_url_ttl_days(),
        }
    }
}

fn default_content_root() -> String {
    dirs::data_dir()
        .map(|p| p.join("courier").join("media"))
        .and_then(|p| p.to_str().map(|s| s.to_string()))
        .unwrap_or_else(|| "media".to_string())
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8380".to_string()
}

fn default_url_ttl_days() -> u64 {
    7
}

/// Conversation context compression configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// How many recent turns the compressor reads from the store.
    #[serde(default = "default_history_window")]
    pub history_window: i64,

    /// Per-line character cap applied to each compressed turn.
    #[serde(default = "default_line_max_chars")]
    pub line_max_chars: usize,

    /// How many turns the fallback responder replays into the prompt.
    #[serde(default = "default_prompt_history_turns")]
    pub prompt_history_turns: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            line_max_chars: default_line_max_chars(),
            prompt_history_turns: default_prompt_history_turns(),
        }
    }
}

fn default_history_window() -> i64 {
    30
}

fn default_line_max_chars() -> usize {
    200
}

fn default_prompt_history_turns() -> usize {
    15
}

/// Gateway HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8380
}

/// Outbound dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Seconds between scans for pending outbound messages.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}

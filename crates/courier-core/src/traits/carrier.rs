// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Carrier client trait for the external messaging provider's REST API.

use async_trait::async_trait;

use crate::error::CourierError;
use crate::traits::adapter::PluginAdapter;

/// Client for the carrier's delivery and media APIs.
///
/// All calls authenticate with the relay's own service credentials, never
/// the user's. Implementations cache credentials for process lifetime;
/// the orchestrator receives this as an injected trait object.
#[async_trait]
pub trait CarrierClient: PluginAdapter {
    /// Sends a text message to a channel identity. Returns the carrier's
    /// message id on success.
    async fn send_message(&self, to: &str, body: &str) -> Result<String, CourierError>;

    /// Sends a best-effort typing indicator. Callers log and ignore errors.
    async fn send_typing(&self, to: &str) -> Result<(), CourierError>;

    /// Downloads a carrier-hosted media attachment. Returns the bytes and
    /// the content type reported by the carrier.
    async fn download_media(&self, url: &str) -> Result<(Vec<u8>, String), CourierError>;
}

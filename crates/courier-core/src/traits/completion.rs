// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion client trait for the fallback chat model.

use async_trait::async_trait;

use crate::error::CourierError;
use crate::traits::adapter::PluginAdapter;
use crate::types::CompletionRequest;

/// Client for a general-purpose chat-completion model.
///
/// The fallback responder is the sole caller and swallows every error this
/// trait surfaces, so implementations should report failures faithfully
/// rather than substituting text themselves.
#[async_trait]
pub trait CompletionClient: PluginAdapter {
    /// Sends a completion request and returns the raw completion text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CourierError>;
}

// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-context collaborator trait.

use async_trait::async_trait;

use crate::error::CourierError;
use crate::traits::adapter::PluginAdapter;

/// Read-only source of a user's profile/goals/health/brokerage context
/// block, consumed verbatim by the fallback responder's system prompt.
///
/// Owned by an external collaborator; a read failure degrades the prompt
/// (the block is omitted) and never blocks a reply.
#[async_trait]
pub trait UserContextSource: PluginAdapter {
    /// Returns the context block for a user, or `None` when the
    /// collaborator has nothing for them.
    async fn context_block(&self, user_id: &str) -> Result<Option<String>, CourierError>;
}

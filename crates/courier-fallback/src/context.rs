// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stand-in user-context source.

use async_trait::async_trait;
use courier_core::error::CourierError;
use courier_core::traits::{PluginAdapter, UserContextSource};
use courier_core::types::{AdapterType, HealthStatus};
use semver::Version;

/// No-op context source used when no collaborator is wired in.
///
/// The user-context collaborator lives outside this workspace; until one
/// is attached the responder prompts without a context block.
pub struct NullContextSource;

#[async_trait]
impl PluginAdapter for NullContextSource {
    fn name(&self) -> &str {
        "null-context"
    }

    fn version(&self) -> Version {
        Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::UserContext
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl UserContextSource for NullContextSource {
    async fn context_block(&self, _user_id: &str) -> Result<Option<String>, CourierError> {
        Ok(None)
    }
}

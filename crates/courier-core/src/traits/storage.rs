// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the relay's persistence backend.

use async_trait::async_trait;

use crate::error::CourierError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    DeliveryStatus, PendingTask, PresenceRecord, PresenceState, StoredMessage, TaskStatus,
    TurnSummary, User,
};

/// Persistence operations used by the relay orchestrator and dispatcher.
///
/// The message log is append-only: after [`insert_message`], only the
/// delivery status and error text may be rewritten via
/// [`update_message_status`].
///
/// [`insert_message`]: StorageAdapter::insert_message
/// [`update_message_status`]: StorageAdapter::update_message_status
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), CourierError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), CourierError>;

    // --- User operations ---

    /// Returns all users matching a normalized channel identity.
    ///
    /// More than one row is a data anomaly the caller logs and tolerates.
    async fn find_users_by_identity(
        &self,
        channel_identity: &str,
    ) -> Result<Vec<User>, CourierError>;

    /// Inserts a user. A concurrent insert of the same identity is not an
    /// error; the caller re-selects to get the winning row.
    async fn create_user(&self, user: &User) -> Result<(), CourierError>;

    /// Looks up a user by id.
    async fn get_user(&self, id: &str) -> Result<Option<User>, CourierError>;

    // --- Message operations ---

    /// Appends a message to the conversation log.
    async fn insert_message(&self, message: &StoredMessage) -> Result<(), CourierError>;

    /// Returns the most recent `limit` turns for a user in chronological
    /// order, each reduced to direction and content.
    async fn recent_turns(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<TurnSummary>, CourierError>;

    /// Rewrites the delivery status of a message. The only permitted
    /// post-insert mutation.
    async fn update_message_status(
        &self,
        message_id: &str,
        status: DeliveryStatus,
        carrier_message_id: Option<&str>,
        delivery_error: Option<&str>,
    ) -> Result<(), CourierError>;

    /// Returns outbound messages still pending carrier delivery on the
    /// given channel, oldest first.
    async fn pending_outbound(&self, channel: &str) -> Result<Vec<StoredMessage>, CourierError>;

    // --- Presence operations ---

    /// Reads the presence record for a user, if any.
    async fn get_presence(&self, user_id: &str) -> Result<Option<PresenceRecord>, CourierError>;

    /// Upserts a heartbeat. Mirrors the external local-agent write path;
    /// exists here for tests and operational tooling only.
    async fn record_heartbeat(
        &self,
        user_id: &str,
        state: PresenceState,
        at: &str,
    ) -> Result<(), CourierError>;

    // --- Pending-task operations ---

    /// Inserts a follow-up task for the local agent.
    async fn insert_task(&self, task: &PendingTask) -> Result<(), CourierError>;

    /// Returns tasks for a user filtered by status, oldest first.
    async fn tasks_for_user(
        &self,
        user_id: &str,
        status: TaskStatus,
    ) -> Result<Vec<PendingTask>, CourierError>;
}

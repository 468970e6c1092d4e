// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use courier_config::model::StorageConfig;
use courier_core::types::{
    AdapterType, DeliveryStatus, HealthStatus, PendingTask, PresenceRecord, PresenceState,
    StoredMessage, TaskStatus, TurnSummary, User,
};
use courier_core::{CourierError, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, CourierError> {
        self.db.get().ok_or_else(|| CourierError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Full message rows for a user, oldest first. Operational/status
    /// surface and tests; not part of [`StorageAdapter`].
    pub async fn messages_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<StoredMessage>, CourierError> {
        queries::messages::messages_for_user(self.db()?, user_id).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), CourierError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| CourierError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CourierError> {
        self.db()?.close().await
    }

    // --- User operations ---

    async fn find_users_by_identity(
        &self,
        channel_identity: &str,
    ) -> Result<Vec<User>, CourierError> {
        queries::users::find_by_identity(self.db()?, channel_identity).await
    }

    async fn create_user(&self, user: &User) -> Result<(), CourierError> {
        queries::users::create_user(self.db()?, user).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, CourierError> {
        queries::users::get_user(self.db()?, id).await
    }

    // --- Message operations ---

    async fn insert_message(&self, message: &StoredMessage) -> Result<(), CourierError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn recent_turns(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<TurnSummary>, CourierError> {
        queries::messages::recent_turns(self.db()?, user_id, limit).await
    }

    async fn update_message_status(
        &self,
        message_id: &str,
        status: DeliveryStatus,
        carrier_message_id: Option<&str>,
        delivery_error: Option<&str>,
    ) -> Result<(), CourierError> {
        queries::messages::update_status(
            self.db()?,
            message_id,
            status,
            carrier_message_id,
            delivery_error,
        )
        .await
    }

    async fn pending_outbound(&self, channel: &str) -> Result<Vec<StoredMessage>, CourierError> {
        queries::messages::pending_outbound(self.db()?, channel).await
    }

    // --- Presence operations ---

    async fn get_presence(&self, user_id: &str) -> Result<Option<PresenceRecord>, CourierError> {
        queries::presence::get_presence(self.db()?, user_id).await
    }

    async fn record_heartbeat(
        &self,
        user_id: &str,
        state: PresenceState,
        at: &str,
    ) -> Result<(), CourierError> {
        queries::presence::record_heartbeat(self.db()?, user_id, state, at).await
    }

    // --- Pending-task operations ---

    async fn insert_task(&self, task: &PendingTask) -> Result<(), CourierError> {
        queries::tasks::insert_task(self.db()?, task).await
    }

    async fn tasks_for_user(
        &self,
        user_id: &str,
        status: TaskStatus,
    ) -> Result<Vec<PendingTask>, CourierError> {
        queries::tasks::tasks_for_user(self.db()?, user_id, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::types::{CHANNEL_WHATSAPP, Direction, Visibility};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(
            dir.path().join("a.db").to_str().unwrap(),
        ));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(
            dir.path().join("d.db").to_str().unwrap(),
        ));
        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(
            dir.path().join("h.db").to_str().unwrap(),
        ));
        assert!(storage.health_check().await.is_err());
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn full_relay_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(
            dir.path().join("l.db").to_str().unwrap(),
        ));
        storage.initialize().await.unwrap();

        let user = User {
            id: "u1".to_string(),
            channel_identity: "15551234567".to_string(),
            first_name: Some("Sam".to_string()),
            private_mode_default: false,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        };
        storage.create_user(&user).await.unwrap();
        let found = storage.find_users_by_identity("15551234567").await.unwrap();
        assert_eq!(found.len(), 1);

        let msg = StoredMessage {
            id: "m1".to_string(),
            user_id: "u1".to_string(),
            direction: Direction::Inbound,
            content: "hi".to_string(),
            channel: CHANNEL_WHATSAPP.to_string(),
            carrier_message_id: Some("SM1".to_string()),
            status: DeliveryStatus::Sent,
            visibility: Visibility::Visible,
            needs_response: true,
            context_snapshot: None,
            media: vec![],
            source: None,
            delivery_error: None,
            created_at: "2026-01-01T00:00:01.000Z".to_string(),
        };
        storage.insert_message(&msg).await.unwrap();

        let turns = storage.recent_turns("u1", 30).await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].direction, Direction::Inbound);

        storage
            .record_heartbeat("u1", PresenceState::Online, "2026-01-01T00:00:30.000Z")
            .await
            .unwrap();
        let presence = storage.get_presence("u1").await.unwrap().unwrap();
        assert_eq!(presence.state, PresenceState::Online);

        storage.shutdown().await.unwrap();
    }
}

// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence liveness check.
//!
//! Heartbeats are written by the external local-agent collaborator; this
//! module only reads them. Liveness is the orchestrator's single branching
//! decision, so every failure mode here maps to "offline".

use chrono::{DateTime, Duration, Utc};
use courier_core::traits::StorageAdapter;
use courier_core::types::PresenceState;
use tracing::warn;

/// Whether the user's local agent is live at `now`.
///
/// Live iff the presence state is `online` or `busy` and the last
/// heartbeat is within `window`. Missing row, read failure, or an
/// unparseable heartbeat timestamp all count as offline.
pub async fn is_live(
    storage: &dyn StorageAdapter,
    user_id: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    let record = match storage.get_presence(user_id).await {
        Ok(Some(record)) => record,
        Ok(None) => return false,
        Err(error) => {
            warn!(user_id, %error, "presence read failed, treating agent as offline");
            return false;
        }
    };

    if !matches!(record.state, PresenceState::Online | PresenceState::Busy) {
        return false;
    }

    match DateTime::parse_from_rfc3339(&record.last_heartbeat_at) {
        Ok(heartbeat) => now.signed_duration_since(heartbeat.with_timezone(&Utc)) <= window,
        Err(error) => {
            warn!(
                user_id,
                last_heartbeat_at = record.last_heartbeat_at,
                %error,
                "unparseable heartbeat timestamp, treating agent as offline"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use courier_config::model::StorageConfig;
    use courier_storage::SqliteStorage;

    use super::*;

    async fn storage() -> (tempfile::TempDir, SqliteStorage) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("relay.db").display().to_string(),
            wal_mode: false,
        };
        let storage = SqliteStorage::new(config);
        storage.initialize().await.unwrap();
        storage
            .create_user(&courier_core::types::User {
                id: "u-1".to_string(),
                channel_identity: "15551234567".to_string(),
                first_name: None,
                private_mode_default: false,
                created_at: Utc::now().to_rfc3339(),
            })
            .await
            .unwrap();
        (dir, storage)
    }

    fn window() -> Duration {
        Duration::seconds(300)
    }

    #[tokio::test]
    async fn missing_record_is_offline() {
        let (_dir, storage) = storage().await;
        assert!(!is_live(&storage, "u-1", Utc::now(), window()).await);
    }

    #[tokio::test]
    async fn fresh_online_heartbeat_is_live() {
        let (_dir, storage) = storage().await;
        let now = Utc::now();
        storage
            .record_heartbeat("u-1", PresenceState::Online, &now.to_rfc3339())
            .await
            .unwrap();
        assert!(is_live(&storage, "u-1", now, window()).await);
    }

    #[tokio::test]
    async fn busy_counts_as_live_but_offline_state_never_does() {
        let (_dir, storage) = storage().await;
        let now = Utc::now();
        storage
            .record_heartbeat("u-1", PresenceState::Busy, &now.to_rfc3339())
            .await
            .unwrap();
        assert!(is_live(&storage, "u-1", now, window()).await);

        storage
            .record_heartbeat("u-1", PresenceState::Offline, &now.to_rfc3339())
            .await
            .unwrap();
        assert!(!is_live(&storage, "u-1", now, window()).await);
    }

    #[tokio::test]
    async fn liveness_decays_without_new_heartbeats() {
        let (_dir, storage) = storage().await;
        let now = Utc::now();
        let heartbeat = now - Duration::minutes(1);
        storage
            .record_heartbeat("u-1", PresenceState::Online, &heartbeat.to_rfc3339())
            .await
            .unwrap();

        assert!(is_live(&storage, "u-1", now, window()).await);
        assert!(!is_live(&storage, "u-1", now + Duration::minutes(10), window()).await);
    }

    #[tokio::test]
    async fn garbage_heartbeat_timestamp_is_offline() {
        let (_dir, storage) = storage().await;
        storage
            .record_heartbeat("u-1", PresenceState::Online, "yesterday-ish")
            .await
            .unwrap();
        assert!(!is_live(&storage, "u-1", Utc::now(), window()).await);
    }
}

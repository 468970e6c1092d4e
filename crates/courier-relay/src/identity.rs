// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone normalization and user identity resolution.

use chrono::Utc;
use courier_core::error::CourierError;
use courier_core::traits::StorageAdapter;
use courier_core::types::User;
use tracing::{info, warn};
use uuid::Uuid;

/// Normalize a carrier-supplied sender string to a digits-only channel
/// identity with a leading country code.
///
/// Bare 10-digit national numbers gain a leading `1`; anything longer is
/// assumed to already carry its country code. Idempotent.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("1{digits}")
    } else {
        digits
    }
}

fn first_name_from_profile(profile_name: Option<&str>) -> Option<String> {
    profile_name
        .and_then(|name| name.split_whitespace().next())
        .map(str::to_string)
}

/// Look up the user owning a sender identity, creating one on first
/// contact.
///
/// Creation is insert-or-ignore followed by a re-select, so two racing
/// first-contact messages converge on a single row. Multiple existing
/// matches are a data anomaly: logged, first row wins, never an error.
pub async fn resolve_identity(
    storage: &dyn StorageAdapter,
    raw_sender: &str,
    profile_name: Option<&str>,
) -> Result<User, CourierError> {
    let identity = normalize_phone(raw_sender);

    let matches = storage.find_users_by_identity(&identity).await?;
    if matches.len() > 1 {
        warn!(
            channel_identity = identity,
            count = matches.len(),
            "multiple users share one channel identity, using the oldest"
        );
    }
    if let Some(user) = matches.into_iter().next() {
        return Ok(user);
    }

    let candidate = User {
        id: Uuid::new_v4().to_string(),
        channel_identity: identity.clone(),
        first_name: first_name_from_profile(profile_name),
        private_mode_default: false,
        created_at: Utc::now().to_rfc3339(),
    };
    storage.create_user(&candidate).await?;

    // Re-select in case a concurrent first message won the insert.
    let user = storage
        .find_users_by_identity(&identity)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            CourierError::Internal(format!("user vanished after insert for identity {identity}"))
        })?;
    info!(user_id = user.id, channel_identity = identity, "resolved identity");
    Ok(user)
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
        (dir, storage)
    }

    #[test]
    fn normalization_strips_formatting_and_prefixes_country_code() {
        assert_eq!(normalize_phone("+1 (555) 123-4567"), "15551234567");
        assert_eq!(normalize_phone("5551234567"), "15551234567");
        assert_eq!(normalize_phone("whatsapp:+15551234567"), "15551234567");
        assert_eq!(normalize_phone("+447911123456"), "447911123456");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["5551234567", "+1 555 123 4567", "+447911123456", "12345"] {
            let once = normalize_phone(raw);
            assert_eq!(normalize_phone(&once), once, "not idempotent for {raw}");
        }
    }

    #[tokio::test]
    async fn first_contact_creates_a_user_with_profile_first_name() {
        let (_dir, storage) = storage().await;
        let user = resolve_identity(&storage, "+1 (555) 123-4567", Some("Sam Carver"))
            .await
            .unwrap();
        assert_eq!(user.channel_identity, "15551234567");
        assert_eq!(user.first_name.as_deref(), Some("Sam"));
        assert!(!user.private_mode_default);
    }

    #[tokio::test]
    async fn repeat_contact_resolves_to_the_same_user() {
        let (_dir, storage) = storage().await;
        let first = resolve_identity(&storage, "5551234567", Some("Sam"))
            .await
            .unwrap();
        // Different formatting, same number, no profile this time.
        let second = resolve_identity(&storage, "+1 (555) 123-4567", None)
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.first_name.as_deref(), Some("Sam"));
    }

    #[tokio::test]
    async fn racing_first_contacts_converge_on_one_user() {
        let (_dir, storage) = storage().await;
        let (a, b) = tokio::join!(
            resolve_identity(&storage, "5551234567", Some("Sam")),
            resolve_identity(&storage, "+15551234567", Some("Sam")),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.id, b.id);
        let rows = storage.find_users_by_identity("15551234567").await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}

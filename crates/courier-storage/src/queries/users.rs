// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User identity operations.

use courier_core::CourierError;
use rusqlite::params;

use crate::database::Database;
use crate::models::User;

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        channel_identity: row.get(1)?,
        first_name: row.get(2)?,
        private_mode_default: row.get::<_, i64>(3)? != 0,
        created_at: row.get(4)?,
    })
}

const USER_COLUMNS: &str = "id, channel_identity, first_name, private_mode_default, created_at";

/// Find all users with the given normalized channel identity.
///
/// The identity column is UNIQUE, so more than one row indicates a data
/// anomaly the caller logs and tolerates.
pub async fn find_by_identity(
    db: &Database,
    channel_identity: &str,
) -> Result<Vec<User>, CourierError> {
    let channel_identity = channel_identity.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE channel_identity = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![channel_identity], row_to_user)?;
            let mut users = Vec::new();
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a user, ignoring the insert if the identity already exists.
///
/// Two racing first-contact messages both call this; the UNIQUE constraint
/// plus `ON CONFLICT DO NOTHING` guarantees a single surviving row, and
/// both callers re-select to find it.
pub async fn create_user(db: &Database, user: &User) -> Result<(), CourierError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, channel_identity, first_name, private_mode_default, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(channel_identity) DO NOTHING",
                params![
                    user.id,
                    user.channel_identity,
                    user.first_name,
                    user.private_mode_default as i64,
                    user.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a user by id.
pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, CourierError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
            ))?;
            let mut rows = stmt.query_map(params![id], row_to_user)?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

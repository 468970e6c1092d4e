// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence heartbeat reads.
//!
//! Heartbeats are written by the external local-agent collaborator; the
//! relay only reads them. The upsert exists for tests and operational
//! tooling that stand in for that collaborator.

use courier_core::CourierError;
use courier_core::types::PresenceState;
use rusqlite::params;

use crate::database::Database;
use crate::models::PresenceRecord;
use crate::queries::text_col;

/// Read the presence record for a user, if any.
pub async fn get_presence(
    db: &Database,
    user_id: &str,
) -> Result<Option<PresenceRecord>, CourierError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, state, last_heartbeat_at FROM presence WHERE user_id = ?1",
            )?;
            let mut rows = stmt.query_map(params![user_id], |row| {
                Ok(PresenceRecord {
                    user_id: row.get(0)?,
                    state: text_col::<PresenceState>(1, row.get(1)?)?,
                    last_heartbeat_at: row.get(2)?,
                })
            })?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Upsert a heartbeat, mirroring the collaborator's write path.
pub async fn record_heartbeat(
    db: &Database,
    user_id: &str,
    state: PresenceState,
    at: &str,
) -> Result<(), CourierError> {
    let user_id = user_id.to_string();
    let state = state.to_string();
    let at = at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO presence (user_id, state, last_heartbeat_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE
                 SET state = excluded.state,
                     last_heartbeat_at = excluded.last_heartbeat_at",
                params![user_id, state, at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

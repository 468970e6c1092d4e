// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation log operations.
//!
//! The log is append-only: [`insert_message`] writes a full row once, and
//! [`update_status`] is the only mutation allowed afterwards.

use courier_core::CourierError;
use courier_core::types::{DeliveryStatus, Direction, StoredMedia};
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::Database;
use crate::models::{StoredMessage, TurnSummary};
use crate::queries::text_col;

const MESSAGE_COLUMNS: &str = "id, user_id, direction, content, channel, carrier_message_id, \
     status, visibility, needs_response, context_snapshot, media, source, delivery_error, \
     created_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<StoredMessage, rusqlite::Error> {
    let media_json: String = row.get(10)?;
    let media: Vec<StoredMedia> = serde_json::from_str(&media_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e)))?;
    Ok(StoredMessage {
        id: row.get(0)?,
        user_id: row.get(1)?,
        direction: text_col(2, row.get(2)?)?,
        content: row.get(3)?,
        channel: row.get(4)?,
        carrier_message_id: row.get(5)?,
        status: text_col(6, row.get(6)?)?,
        visibility: text_col(7, row.get(7)?)?,
        needs_response: row.get::<_, i64>(8)? != 0,
        context_snapshot: row.get(9)?,
        media,
        source: row.get(11)?,
        delivery_error: row.get(12)?,
        created_at: row.get(13)?,
    })
}

/// Append a message to the conversation log.
pub async fn insert_message(db: &Database, msg: &StoredMessage) -> Result<(), CourierError> {
    let msg = msg.clone();
    let media_json = serde_json::to_string(&msg.media).map_err(|e| CourierError::Storage {
        source: Box::new(e),
    })?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, user_id, direction, content, channel,
                     carrier_message_id, status, visibility, needs_response,
                     context_snapshot, media, source, delivery_error, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    msg.id,
                    msg.user_id,
                    msg.direction.to_string(),
                    msg.content,
                    msg.channel,
                    msg.carrier_message_id,
                    msg.status.to_string(),
                    msg.visibility.to_string(),
                    msg.needs_response as i64,
                    msg.context_snapshot,
                    media_json,
                    msg.source,
                    msg.delivery_error,
                    msg.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Return the most recent `limit` turns for a user in chronological order,
/// reduced to direction and content.
pub async fn recent_turns(
    db: &Database,
    user_id: &str,
    limit: i64,
) -> Result<Vec<TurnSummary>, CourierError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            // Newest-first for the LIMIT, then reversed back to chronological.
            let mut stmt = conn.prepare(
                "SELECT direction, content FROM messages
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![user_id, limit], |row| {
                Ok(TurnSummary {
                    direction: text_col::<Direction>(0, row.get(0)?)?,
                    content: row.get(1)?,
                })
            })?;
            let mut turns = Vec::new();
            for row in rows {
                turns.push(row?);
            }
            turns.reverse();
            Ok(turns)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Rewrite the delivery status of a message.
pub async fn update_status(
    db: &Database,
    message_id: &str,
    status: DeliveryStatus,
    carrier_message_id: Option<&str>,
    delivery_error: Option<&str>,
) -> Result<(), CourierError> {
    let message_id = message_id.to_string();
    let status = status.to_string();
    let carrier_message_id = carrier_message_id.map(|s| s.to_string());
    let delivery_error = delivery_error.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE messages
                 SET status = ?2,
                     carrier_message_id = COALESCE(?3, carrier_message_id),
                     delivery_error = ?4
                 WHERE id = ?1",
                params![message_id, status, carrier_message_id, delivery_error],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Return every message for a user, oldest first. Operational/status
/// surface and tests; the relay itself reads [`recent_turns`].
pub async fn messages_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<StoredMessage>, CourierError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE user_id = ?1
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![user_id], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Return outbound messages still pending delivery on a channel, oldest first.
pub async fn pending_outbound(
    db: &Database,
    channel: &str,
) -> Result<Vec<StoredMessage>, CourierError> {
    let channel = channel.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE direction = 'outbound' AND status = 'pending' AND channel = ?1
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![channel], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

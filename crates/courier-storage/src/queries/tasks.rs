// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending follow-up task operations.

use courier_core::CourierError;
use courier_core::types::TaskStatus;
use rusqlite::params;

use crate::database::Database;
use crate::models::PendingTask;
use crate::queries::text_col;

fn row_to_task(row: &rusqlite::Row<'_>) -> Result<PendingTask, rusqlite::Error> {
    Ok(PendingTask {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: row.get(2)?,
        original_message: row.get(3)?,
        provisional_response: row.get(4)?,
        context_snapshot: row.get(5)?,
        has_media: row.get::<_, i64>(6)? != 0,
        status: text_col::<TaskStatus>(7, row.get(7)?)?,
        created_at: row.get(8)?,
    })
}

/// Insert a follow-up task for the local agent.
pub async fn insert_task(db: &Database, task: &PendingTask) -> Result<(), CourierError> {
    let task = task.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pending_tasks (id, user_id, kind, original_message,
                     provisional_response, context_snapshot, has_media, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    task.id,
                    task.user_id,
                    task.kind,
                    task.original_message,
                    task.provisional_response,
                    task.context_snapshot,
                    task.has_media as i64,
                    task.status.to_string(),
                    task.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Return tasks for a user filtered by status, oldest first.
pub async fn tasks_for_user(
    db: &Database,
    user_id: &str,
    status: TaskStatus,
) -> Result<Vec<PendingTask>, CourierError> {
    let user_id = user_id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, kind, original_message, provisional_response,
                        context_snapshot, has_media, status, created_at
                 FROM pending_tasks
                 WHERE user_id = ?1 AND status = ?2
                 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![user_id, status], row_to_task)?;
            let mut tasks = Vec::new();
            for row in rows {
                tasks.push(row?);
            }
            Ok(tasks)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

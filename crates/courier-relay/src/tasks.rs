// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending-task enqueue for cloud-answered turns.

use chrono::Utc;
use courier_core::traits::StorageAdapter;
use courier_core::types::{PendingTask, TASK_KIND_CHANNEL_FOLLOWUP, TaskStatus};
use tracing::{info, warn};
use uuid::Uuid;

/// Record that the fallback answered provisionally and the local agent
/// must follow up once it reconnects.
///
/// Write failures are logged and swallowed. A missing follow-up degrades
/// UX but must never fail the webhook response.
pub async fn enqueue_followup(
    storage: &dyn StorageAdapter,
    user_id: &str,
    original_message: &str,
    provisional_response: &str,
    context_snapshot: Option<String>,
    has_media: bool,
) {
    let task = PendingTask {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        kind: TASK_KIND_CHANNEL_FOLLOWUP.to_string(),
        original_message: original_message.to_string(),
        provisional_response: provisional_response.to_string(),
        context_snapshot,
        has_media,
        status: TaskStatus::Pending,
        created_at: Utc::now().to_rfc3339(),
    };
    match storage.insert_task(&task).await {
        Ok(()) => info!(user_id, task_id = task.id, "follow-up task enqueued"),
        Err(error) => warn!(user_id, %error, "failed to enqueue follow-up task"),
    }
}

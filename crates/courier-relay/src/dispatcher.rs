// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound dispatcher.
//!
//! Polls the message log for agent-authored outbound rows still pending
//! carrier delivery and pushes each to the carrier's send API. Delivery
//! is at-least-once: a crash between the send and the status write can
//! repeat a message on the next poll.

use std::sync::Arc;
use std::time::Duration;

use courier_core::traits::{CarrierClient, StorageAdapter};
use courier_core::types::{CHANNEL_WHATSAPP, DeliveryStatus, StoredMessage};
use tracing::{debug, info, warn};

pub struct Dispatcher {
    storage: Arc<dyn StorageAdapter>,
    carrier: Arc<dyn CarrierClient>,
}

impl Dispatcher {
    pub fn new(storage: Arc<dyn StorageAdapter>, carrier: Arc<dyn CarrierClient>) -> Self {
        Self { storage, carrier }
    }

    /// One scan over pending outbound messages. Returns how many were
    /// delivered.
    pub async fn dispatch_pending(&self) -> usize {
        let pending = match self.storage.pending_outbound(CHANNEL_WHATSAPP).await {
            Ok(pending) => pending,
            Err(error) => {
                warn!(%error, "pending outbound scan failed");
                return 0;
            }
        };
        if pending.is_empty() {
            return 0;
        }
        debug!(count = pending.len(), "dispatching pending outbound messages");

        let mut delivered = 0;
        for message in pending {
            if self.dispatch_one(&message).await {
                delivered += 1;
            }
        }
        delivered
    }

    async fn dispatch_one(&self, message: &StoredMessage) -> bool {
        let user = match self.storage.get_user(&message.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(message_id = message.id, user_id = message.user_id, "outbound message for unknown user");
                self.mark(message, DeliveryStatus::Error, None, Some("unknown user"))
                    .await;
                return false;
            }
            Err(error) => {
                warn!(message_id = message.id, %error, "user lookup failed, will retry next poll");
                return false;
            }
        };

        match self
            .carrier
            .send_message(&user.channel_identity, &message.content)
            .await
        {
            Ok(carrier_id) => {
                info!(message_id = message.id, carrier_id, "outbound message delivered");
                self.mark(message, DeliveryStatus::Sent, Some(&carrier_id), None)
                    .await;
                true
            }
            Err(error) => {
                warn!(message_id = message.id, %error, "carrier send failed");
                self.mark(
                    message,
                    DeliveryStatus::Error,
                    None,
                    Some(&error.to_string()),
                )
                .await;
                false
            }
        }
    }

    async fn mark(
        &self,
        message: &StoredMessage,
        status: DeliveryStatus,
        carrier_id: Option<&str>,
        error_text: Option<&str>,
    ) {
        if let Err(error) = self
            .storage
            .update_message_status(&message.id, status, carrier_id, error_text)
            .await
        {
            warn!(message_id = message.id, %error, "failed to record delivery status");
        }
    }

    /// Poll loop for the serve command. Runs until the task is dropped.
    pub async fn run(self: Arc<Self>, poll_interval: Duration) {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.dispatch_pending().await;
        }
    }
}

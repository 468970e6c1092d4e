// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment ingestion pipeline.

use std::sync::Arc;

use courier_core::traits::CarrierClient;
use courier_core::types::{MediaAttachment, StoredMedia};
use tracing::{debug, warn};

use crate::sign::UrlSigner;
use crate::store::ContentStore;

/// Downloads inbound attachments from the carrier, persists them to the
/// content store, and mints signed retrieval URLs.
///
/// Ingestion is best-effort per attachment: a failed download or write is
/// logged and that attachment skipped, so one bad item never loses the
/// message or its siblings.
pub struct MediaIngestor {
    carrier: Arc<dyn CarrierClient>,
    store: ContentStore,
    signer: UrlSigner,
}

impl MediaIngestor {
    pub fn new(carrier: Arc<dyn CarrierClient>, store: ContentStore, signer: UrlSigner) -> Self {
        Self {
            carrier,
            store,
            signer,
        }
    }

    pub async fn ingest(&self, user_id: &str, attachments: &[MediaAttachment]) -> Vec<StoredMedia> {
        let mut stored = Vec::with_capacity(attachments.len());
        for (index, attachment) in attachments.iter().enumerate() {
            match self.ingest_one(user_id, index, attachment).await {
                Ok(media) => stored.push(media),
                Err(error) => {
                    warn!(
                        user_id,
                        index,
                        carrier_url = %attachment.url,
                        %error,
                        "attachment ingestion failed, skipping"
                    );
                }
            }
        }
        stored
    }

    async fn ingest_one(
        &self,
        user_id: &str,
        index: usize,
        attachment: &MediaAttachment,
    ) -> Result<StoredMedia, courier_core::error::CourierError> {
        let (bytes, downloaded_type) = self.carrier.download_media(&attachment.url).await?;
        // The download response header is authoritative; the webhook's
        // declared type is the fallback.
        let content_type = if downloaded_type.is_empty() {
            attachment.content_type.clone()
        } else {
            downloaded_type
        };
        let file = self.store.save(user_id, index, &bytes, &content_type).await?;
        debug!(user_id, file, content_type, size = bytes.len(), "attachment stored");
        Ok(StoredMedia {
            url: self.signer.signed_url(user_id, &file),
            content_type,
        })
    }
}

// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook payload parsing.
//!
//! The carrier posts either form-encoded or JSON bodies with the same field
//! names. Parsing happens once at the boundary and produces a typed
//! [`InboundPayload`]; nothing downstream touches raw key-value maps.

use std::collections::HashMap;

use courier_core::types::{InboundPayload, MediaAttachment};

/// Address scheme prefix the carrier puts on WhatsApp identities.
const WHATSAPP_SCHEME: &str = "whatsapp:";

/// Upper bound on attachments read from a single webhook, matching the
/// carrier's per-message media limit.
const MAX_MEDIA_ITEMS: usize = 10;

/// Parse a form-encoded webhook body into a typed payload.
///
/// An absent or empty `From` produces a payload with an empty sender; the
/// orchestrator short-circuits that to a no-op acknowledgement rather than
/// an error.
pub fn parse_form(fields: &HashMap<String, String>) -> InboundPayload {
    let get = |key: &str| fields.get(key).map(|s| s.trim().to_string());

    let sender = get("From")
        .map(|s| strip_scheme(&s))
        .unwrap_or_default();
    let body = get("Body").unwrap_or_default();
    let carrier_message_id = get("MessageSid").filter(|s| !s.is_empty());
    let profile_name = get("ProfileName").filter(|s| !s.is_empty());

    // The carrier caps attachments per message; the count is attacker
    // controlled input, so clamp before allocating.
    let num_media: usize = get("NumMedia")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
        .min(MAX_MEDIA_ITEMS);

    let mut media = Vec::with_capacity(num_media);
    for i in 0..num_media {
        let Some(url) = get(&format!("MediaUrl{i}")).filter(|s| !s.is_empty()) else {
            continue;
        };
        let content_type = get(&format!("MediaContentType{i}"))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        media.push(MediaAttachment { url, content_type });
    }

    InboundPayload {
        sender,
        body,
        carrier_message_id,
        profile_name,
        media,
    }
}

/// Parse a JSON webhook body carrying the same field names as the form.
pub fn parse_json(value: &serde_json::Value) -> InboundPayload {
    let fields: HashMap<String, String> = value
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| {
                    let s = match v {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Number(n) => n.to_string(),
                        _ => return None,
                    };
                    Some((k.clone(), s))
                })
                .collect()
        })
        .unwrap_or_default();
    parse_form(&fields)
}

fn strip_scheme(sender: &str) -> String {
    sender
        .strip_prefix(WHATSAPP_SCHEME)
        .unwrap_or(sender)
        .to_string()
}

// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TwiML acknowledgement envelopes for the inbound webhook.
//!
//! The webhook always answers HTTP 200 with one of these envelopes, whatever
//! happened internally; the empty envelope tells the carrier "received,
//! nothing to say inline".

/// Content type of every webhook acknowledgement.
pub const CONTENT_TYPE: &str = "text/xml";

/// The empty acknowledgement used on the defer and ignore paths.
pub fn empty() -> String {
    "<Response></Response>".to_string()
}

/// An acknowledgement carrying an inline reply.
pub fn message(text: &str) -> String {
    format!("<Response><Message>{}</Message></Response>", escape(text))
}

/// Escape the five XML-special characters for element content.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

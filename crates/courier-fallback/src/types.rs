// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-completion API request/response wire types.

use courier_core::types::{ChatContent, ChatTurn, CompletionRequest};
use serde::{Deserialize, Serialize};

/// A request to the chat-completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier.
    pub model: String,
    /// System prompt followed by the conversation turns.
    pub messages: Vec<WireMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

/// A single message in the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    /// Role: "system", "user", or "assistant".
    pub role: String,
    /// Content -- a plain string or an array of typed parts.
    pub content: WireContent,
}

/// Message content -- plain text or structured parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireContent {
    /// Simple text content.
    Text(String),
    /// Array of typed content parts (text, image URL).
    Parts(Vec<WirePart>),
}

/// A typed content part within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WirePart {
    /// Text part.
    #[serde(rename = "text")]
    Text { text: String },
    /// Image part referencing a retrievable URL.
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

/// Image URL wrapper for image parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Response from the chat-completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

/// A single completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

/// The message inside a completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Error response body from the completion API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Error details within an error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(rename = "type", default)]
    pub type_: String,
}

/// Convert a domain [`CompletionRequest`] into the wire format.
///
/// Turns carrying a single text block serialize as plain strings; mixed
/// text/image turns serialize as typed parts.
pub fn to_wire(model: &str, request: &CompletionRequest) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(request.turns.len() + 1);
    messages.push(WireMessage {
        role: "system".to_string(),
        content: WireContent::Text(request.system.clone()),
    });
    for turn in &request.turns {
        messages.push(WireMessage {
            role: turn.role.clone(),
            content: turn_content(turn),
        });
    }
    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        max_tokens: request.max_tokens,
    }
}

fn turn_content(turn: &ChatTurn) -> WireContent {
    if let [ChatContent::Text(text)] = turn.content.as_slice() {
        return WireContent::Text(text.clone());
    }
    WireContent::Parts(
        turn.content
            .iter()
            .map(|c| match c {
                ChatContent::Text(text) => WirePart::Text { text: text.clone() },
                ChatContent::ImageUrl(url) => WirePart::ImageUrl {
                    image_url: ImageUrl { url: url.clone() },
                },
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_turn_serializes_as_string() {
        let request = CompletionRequest {
            system: "be brief".to_string(),
            turns: vec![ChatTurn::text("user", "hi")],
            max_tokens: 100,
        };
        let wire = to_wire("gpt-4o", &request);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn image_turn_serializes_as_parts() {
        let request = CompletionRequest {
            system: "be brief".to_string(),
            turns: vec![ChatTurn {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text("what's this?".to_string()),
                    ChatContent::ImageUrl("https://relay.example/m/f.jpg".to_string()),
                ],
            }],
            max_tokens: 100,
        };
        let wire = to_wire("gpt-4o", &request);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["messages"][1]["content"][0]["type"], "text");
        assert_eq!(
            json["messages"][1]["content"][1]["image_url"]["url"],
            "https://relay.example/m/f.jpg"
        );
    }

    #[test]
    fn response_with_missing_content_deserializes() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }
}

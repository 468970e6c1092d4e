// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline fallback responder.
//!
//! Produces a reply for a user whose local agent is unreachable. The
//! responder never fails and never returns an empty string: any model
//! error or empty completion falls back to a canned acknowledgement.

use std::sync::{Arc, LazyLock};

use courier_core::traits::{CompletionClient, UserContextSource};
use courier_core::types::{CompletionRequest, StoredMedia, TurnSummary, User};
use regex::Regex;
use tracing::{debug, warn};

use crate::prompt::{build_system_prompt, build_turns, canned_acknowledgement};

/// Multi-message delimiter some models emit; everything after the first
/// segment is dropped.
const MESSAGE_DELIMITER: &str = "<|msg|>";

/// Trailing signature lines like `-- sent 14:32` or `- Sent at 09:05 PM`.
static TIMESTAMP_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-{1,2}\s*sent(\s+at)?\s+\d{1,2}:\d{2}(\s*[ap]m)?\s*$")
        .expect("timestamp signature pattern is valid")
});

pub struct FallbackResponder {
    client: Arc<dyn CompletionClient>,
    context_source: Arc<dyn UserContextSource>,
    persona: String,
    reply_char_budget: usize,
    max_tokens: u32,
    prompt_history_turns: usize,
}

impl FallbackResponder {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        context_source: Arc<dyn UserContextSource>,
        persona: impl Into<String>,
        reply_char_budget: usize,
        max_tokens: u32,
        prompt_history_turns: usize,
    ) -> Self {
        Self {
            client,
            context_source,
            persona: persona.into(),
            reply_char_budget,
            max_tokens,
            prompt_history_turns,
        }
    }

    /// Produce a reply for an inbound message. Infallible by contract.
    pub async fn respond(
        &self,
        user: &User,
        body: &str,
        history: &[TurnSummary],
        media: &[StoredMedia],
    ) -> String {
        let first_name = user.first_name.as_deref();

        let context_block = match self.context_source.context_block(&user.id).await {
            Ok(block) => block,
            Err(error) => {
                warn!(user_id = %user.id, %error, "user context lookup failed, continuing without it");
                None
            }
        };

        let request = CompletionRequest {
            system: build_system_prompt(
                &self.persona,
                first_name,
                context_block.as_deref(),
                self.reply_char_budget,
            ),
            turns: build_turns(history, self.prompt_history_turns, body, media),
            max_tokens: self.max_tokens,
        };

        match self.client.complete(request).await {
            Ok(raw) => {
                let cleaned = post_process(&raw, &self.persona);
                if cleaned.is_empty() {
                    debug!(user_id = %user.id, "completion emptied by post-processing, using canned reply");
                    canned_acknowledgement(body, first_name)
                } else {
                    cleaned
                }
            }
            Err(error) => {
                warn!(user_id = %user.id, %error, "fallback completion failed, using canned reply");
                canned_acknowledgement(body, first_name)
            }
        }
    }
}

/// Clean up model output before it is sent to the carrier.
///
/// Strips a leading branding line (`<persona>: ...`), a trailing
/// timestamp-signature line, and anything after the first `<|msg|>`
/// segment.
pub fn post_process(raw: &str, persona: &str) -> String {
    let first_segment = raw
        .split(MESSAGE_DELIMITER)
        .next()
        .unwrap_or_default()
        .trim();

    let mut lines: Vec<&str> = first_segment.lines().collect();

    if let Some(first) = lines.first() {
        let lowered = first.trim().to_lowercase();
        let branding = format!("{}:", persona.to_lowercase());
        if lowered.starts_with(&branding) || lowered.starts_with(&format!("[{}]", persona.to_lowercase())) {
            lines.remove(0);
        }
    }

    while let Some(last) = lines.last() {
        let trimmed = last.trim();
        if trimmed.is_empty() || TIMESTAMP_SIGNATURE.is_match(trimmed) {
            lines.pop();
        } else {
            break;
        }
    }

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use courier_core::error::CourierError;
    use courier_core::types::{Direction, HealthStatus, AdapterType};
    use courier_core::traits::PluginAdapter;
    use semver::Version;

    use super::*;

    struct ScriptedCompletions {
        replies: Mutex<VecDeque<Result<String, CourierError>>>,
    }

    impl ScriptedCompletions {
        fn new(replies: Vec<Result<String, CourierError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
            })
        }
    }

    #[async_trait]
    impl PluginAdapter for ScriptedCompletions {
        fn name(&self) -> &str {
            "scripted"
        }
        fn version(&self) -> Version {
            Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Completion
        }
        async fn health_check(&self) -> Result<HealthStatus, CourierError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), CourierError> {
            Ok(())
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedCompletions {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, CourierError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CourierError::Internal("script exhausted".to_string())))
        }
    }

    struct NoContext;

    #[async_trait]
    impl PluginAdapter for NoContext {
        fn name(&self) -> &str {
            "no-context"
        }
        fn version(&self) -> Version {
            Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::UserContext
        }
        async fn health_check(&self) -> Result<HealthStatus, CourierError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), CourierError> {
            Ok(())
        }
    }

    #[async_trait]
    impl UserContextSource for NoContext {
        async fn context_block(&self, _user_id: &str) -> Result<Option<String>, CourierError> {
            Ok(None)
        }
    }

    fn test_user() -> User {
        User {
            id: "u-1".to_string(),
            channel_identity: "15551234567".to_string(),
            first_name: Some("Sam".to_string()),
            private_mode_default: false,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn responder(client: Arc<dyn CompletionClient>) -> FallbackResponder {
        FallbackResponder::new(client, Arc::new(NoContext), "courier", 600, 400, 15)
    }

    #[test]
    fn post_process_strips_branding_and_timestamp() {
        let raw = "Courier: hello there\nHere is your answer.\n-- sent 14:32";
        assert_eq!(post_process(raw, "courier"), "Here is your answer.");
    }

    #[test]
    fn post_process_truncates_at_delimiter() {
        let raw = "First part.<|msg|>Second part.<|msg|>Third.";
        assert_eq!(post_process(raw, "courier"), "First part.");
    }

    #[test]
    fn post_process_keeps_plain_replies_untouched() {
        let raw = "Your meeting is at 3pm.";
        assert_eq!(post_process(raw, "courier"), raw);
    }

    #[test]
    fn post_process_keeps_times_inside_the_body() {
        let raw = "The train leaves at 14:32 sharp.";
        assert_eq!(post_process(raw, "courier"), raw);
    }

    #[tokio::test]
    async fn respond_returns_cleaned_completion() {
        let client = ScriptedCompletions::new(vec![Ok(
            "courier: branding\nSure, done.\n-- sent 09:05".to_string(),
        )]);
        let reply = responder(client)
            .respond(&test_user(), "do the thing", &[], &[])
            .await;
        assert_eq!(reply, "Sure, done.");
    }

    #[tokio::test]
    async fn respond_falls_back_to_canned_on_error() {
        let client = ScriptedCompletions::new(vec![Err(CourierError::Model {
            message: "boom".to_string(),
            source: None,
        })]);
        let body = "what is my schedule";
        let reply = responder(client).respond(&test_user(), body, &[], &[]).await;
        assert_eq!(reply, canned_acknowledgement(body, Some("Sam")));
    }

    #[tokio::test]
    async fn respond_falls_back_when_post_processing_empties_reply() {
        let client = ScriptedCompletions::new(vec![Ok("courier: only branding".to_string())]);
        let reply = responder(client).respond(&test_user(), "hi", &[], &[]).await;
        assert!(!reply.is_empty());
        assert_eq!(reply, canned_acknowledgement("hi", Some("Sam")));
    }

    #[tokio::test]
    async fn respond_forwards_history_direction_roles() {
        // Exercise build_turns through the responder to keep the wiring honest.
        let history = vec![
            TurnSummary {
                direction: Direction::Inbound,
                content: "earlier question".to_string(),
            },
            TurnSummary {
                direction: Direction::Outbound,
                content: "earlier answer".to_string(),
            },
        ];
        let client = ScriptedCompletions::new(vec![Ok("fine".to_string())]);
        let reply = responder(client)
            .respond(&test_user(), "follow up", &history, &[])
            .await;
        assert_eq!(reply, "fine");
    }
}

// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt and conversation assembly for the fallback responder.

use courier_core::types::{ChatContent, ChatTurn, Direction, StoredMedia, TurnSummary};

/// Behavioral rules appended to every fallback system prompt.
///
/// The character budget is spliced in by [`build_system_prompt`].
const BEHAVIOR_RULES: &str = "Rules:\n\
- Answer the user's question first, before anything else.\n\
- Keep the reply under {budget} characters; this is a chat message, not an essay.\n\
- You have access to the user's data through the context above. Never claim you \
lack access to their information.\n\
- Never mention being a fallback, the user's agent being offline, or any other \
internal routing detail.";

/// Build the system prompt for a fallback completion call.
///
/// Includes the user's first name when known and the user-context block
/// verbatim when the collaborator supplied one.
pub fn build_system_prompt(
    persona: &str,
    first_name: Option<&str>,
    context_block: Option<&str>,
    reply_char_budget: usize,
) -> String {
    let mut prompt = format!(
        "You are {persona}, a personal assistant replying to the user over WhatsApp."
    );
    if let Some(name) = first_name {
        prompt.push_str(&format!("\nThe user's first name is {name}."));
    }
    if let Some(block) = context_block {
        prompt.push_str("\n\nWhat you know about the user:\n");
        prompt.push_str(block);
    }
    prompt.push_str("\n\n");
    prompt.push_str(&BEHAVIOR_RULES.replace("{budget}", &reply_char_budget.to_string()));
    prompt
}

/// Assemble completion turns: up to `history_turns` prior turns, then the
/// current inbound message with any successfully ingested images inlined.
pub fn build_turns(
    history: &[TurnSummary],
    history_turns: usize,
    body: &str,
    media: &[StoredMedia],
) -> Vec<ChatTurn> {
    let start = history.len().saturating_sub(history_turns);
    let mut turns: Vec<ChatTurn> = history[start..]
        .iter()
        .map(|turn| {
            let role = match turn.direction {
                Direction::Inbound => "user",
                Direction::Outbound => "assistant",
            };
            ChatTurn::text(role, turn.content.clone())
        })
        .collect();

    let mut content = Vec::new();
    if !body.is_empty() {
        content.push(ChatContent::Text(body.to_string()));
    }
    for item in media {
        if item.content_type.starts_with("image/") {
            content.push(ChatContent::ImageUrl(item.url.clone()));
        }
    }
    if content.is_empty() {
        // Media-only message whose attachments all failed ingestion.
        content.push(ChatContent::Text("(the user sent an attachment)".to_string()));
    }
    turns.push(ChatTurn {
        role: "user".to_string(),
        content,
    });
    turns
}

/// Canned acknowledgement templates, `{name}` expanded when known.
const CANNED_TEMPLATES: [&str; 3] = [
    "Got it{name} -- I'm on it and will follow up with details shortly.",
    "Thanks{name}, received. Let me look into this and get back to you.",
    "On it{name}. I'll circle back with a proper answer soon.",
];

/// Deterministic canned acknowledgement used when the model call fails.
///
/// Template selection is `body.len() % 3`, so the same message always maps
/// to the same acknowledgement. Never returns an empty string.
pub fn canned_acknowledgement(body: &str, first_name: Option<&str>) -> String {
    let template = CANNED_TEMPLATES[body.len() % CANNED_TEMPLATES.len()];
    let name = first_name
        .map(|n| format!(", {n}"))
        .unwrap_or_default();
    template.replace("{name}", &name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_contains_name_context_and_rules() {
        let prompt = build_system_prompt(
            "courier",
            Some("Sam"),
            Some("Portfolio: 60% VTI, 40% BND."),
            600,
        );
        assert!(prompt.contains("Sam"));
        assert!(prompt.contains("Portfolio: 60% VTI"));
        assert!(prompt.contains("under 600 characters"));
        assert!(prompt.contains("Never claim"));
    }

    #[test]
    fn system_prompt_omits_absent_sections() {
        let prompt = build_system_prompt("courier", None, None, 600);
        assert!(!prompt.contains("first name"));
        assert!(!prompt.contains("What you know"));
    }

    #[test]
    fn build_turns_caps_history() {
        let history: Vec<TurnSummary> = (0..20)
            .map(|i| TurnSummary {
                direction: if i % 2 == 0 {
                    Direction::Inbound
                } else {
                    Direction::Outbound
                },
                content: format!("turn {i}"),
            })
            .collect();
        let turns = build_turns(&history, 15, "current", &[]);
        // 15 history turns plus the current one.
        assert_eq!(turns.len(), 16);
        assert_eq!(turns[0].content, vec![ChatContent::Text("turn 5".to_string())]);
        assert_eq!(turns[15].role, "user");
    }

    #[test]
    fn build_turns_inlines_images_only() {
        let media = vec![
            StoredMedia {
                url: "https://relay.example/m/a.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
            },
            StoredMedia {
                url: "https://relay.example/m/b.pdf".to_string(),
                content_type: "application/pdf".to_string(),
            },
        ];
        let turns = build_turns(&[], 15, "see this", &media);
        let current = turns.last().unwrap();
        assert_eq!(current.content.len(), 2);
        assert!(matches!(&current.content[1], ChatContent::ImageUrl(u) if u.ends_with("a.jpg")));
    }

    #[test]
    fn media_only_turn_with_failed_ingestion_gets_placeholder() {
        let turns = build_turns(&[], 15, "", &[]);
        assert_eq!(
            turns.last().unwrap().content,
            vec![ChatContent::Text("(the user sent an attachment)".to_string())]
        );
    }

    #[test]
    fn canned_acknowledgement_is_deterministic_and_non_empty() {
        for body in ["", "a", "ab", "abc", "hello there"] {
            let text = canned_acknowledgement(body, Some("Sam"));
            assert!(!text.is_empty());
            assert_eq!(text, canned_acknowledgement(body, Some("Sam")));
            assert!(text.contains(", Sam"));
        }
        // Selection is len % 3.
        assert_eq!(
            canned_acknowledgement("abc", None),
            canned_acknowledgement("", None)
        );
    }

    #[test]
    fn canned_acknowledgement_without_name_reads_cleanly() {
        let text = canned_acknowledgement("hi", None);
        assert!(!text.contains("{name}"));
        assert!(!text.contains(", ."));
    }
}

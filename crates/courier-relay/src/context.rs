// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation context compression.

use courier_core::types::{Direction, TurnSummary};

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Render recent turns as a compact `User:`/`AI:` transcript.
///
/// Takes the last `window` turns, caps each line at `line_max_chars`
/// characters, joins with newlines. Returns `None` when the window is
/// empty so callers store the absence of context rather than an empty
/// string.
pub fn compress_context(
    turns: &[TurnSummary],
    window: usize,
    line_max_chars: usize,
) -> Option<String> {
    if turns.is_empty() {
        return None;
    }
    let start = turns.len().saturating_sub(window);
    let lines: Vec<String> = turns[start..]
        .iter()
        .map(|turn| {
            let speaker = match turn.direction {
                Direction::Inbound => "User",
                Direction::Outbound => "AI",
            };
            format!("{speaker}: {}", truncate_chars(&turn.content, line_max_chars))
        })
        .collect();
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(direction: Direction, content: &str) -> TurnSummary {
        TurnSummary {
            direction,
            content: content.to_string(),
        }
    }

    #[test]
    fn empty_window_compresses_to_none() {
        assert_eq!(compress_context(&[], 30, 200), None);
    }

    #[test]
    fn renders_speaker_prefixed_lines_in_order() {
        let turns = vec![
            turn(Direction::Inbound, "what's my balance?"),
            turn(Direction::Outbound, "about $1,200"),
        ];
        assert_eq!(
            compress_context(&turns, 30, 200).unwrap(),
            "User: what's my balance?\nAI: about $1,200"
        );
    }

    #[test]
    fn long_lines_are_capped_per_turn() {
        let turns = vec![turn(Direction::Inbound, &"x".repeat(500))];
        let compressed = compress_context(&turns, 30, 200).unwrap();
        assert_eq!(compressed, format!("User: {}", "x".repeat(200)));
    }

    #[test]
    fn truncation_respects_utf8_boundaries() {
        let turns = vec![turn(Direction::Inbound, &"é".repeat(300))];
        let compressed = compress_context(&turns, 30, 200).unwrap();
        assert_eq!(compressed.chars().count(), "User: ".chars().count() + 200);
    }

    #[test]
    fn window_keeps_only_the_most_recent_turns() {
        let turns: Vec<TurnSummary> = (0..40)
            .map(|i| turn(Direction::Inbound, &format!("m{i}")))
            .collect();
        let compressed = compress_context(&turns, 30, 200).unwrap();
        assert!(!compressed.contains("m9\n"));
        assert!(compressed.starts_with("User: m10"));
        assert!(compressed.ends_with("User: m39"));
    }
}

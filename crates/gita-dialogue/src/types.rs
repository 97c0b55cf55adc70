//! Answer and context-window types produced by the dialogue engine.

use serde::{Deserialize, Serialize};

use gita_core::types::ConversationTurn;

/// A complete answer to one question.
///
/// Immutable after creation and owned by the caller. `llm_used` is false for
/// the greeting and apology paths, where no completion call produced the
/// text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// Verse ids selected by the citation policy, highest-ranked first.
    pub cited_verse_ids: Vec<String>,
    /// Wall-clock duration of the generation call; 0 when no call was made.
    pub generation_latency_ms: u64,
    pub llm_used: bool,
}

/// A bounded, chronological view of one user's most recent turns.
///
/// Derived and never persisted. Both the turn count and the total character
/// budget are respected when the window is assembled; a turn is included
/// whole or not at all.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversationWindow {
    pub turns: Vec<ConversationTurn>,
}

impl ConversationWindow {
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Total characters across all turn texts.
    pub fn char_count(&self) -> usize {
        self.turns.iter().map(|t| t.char_len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gita_core::types::Role;

    #[test]
    fn test_answer_serde_round_trip() {
        let answer = Answer {
            text: "कर्म करो".to_string(),
            cited_verse_ids: vec!["2.47".to_string()],
            generation_latency_ms: 120,
            llm_used: true,
        };
        let json = serde_json::to_string(&answer).unwrap();
        let back: Answer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answer);
    }

    #[test]
    fn test_empty_window() {
        let window = ConversationWindow::default();
        assert!(window.is_empty());
        assert_eq!(window.len(), 0);
        assert_eq!(window.char_count(), 0);
    }

    #[test]
    fn test_window_char_count() {
        let window = ConversationWindow {
            turns: vec![
                ConversationTurn::new(None, Role::User, "abcd", vec![]),
                ConversationTurn::new(None, Role::Assistant, "efg", vec![]),
            ],
        };
        assert_eq!(window.len(), 2);
        assert_eq!(window.char_count(), 7);
    }
}

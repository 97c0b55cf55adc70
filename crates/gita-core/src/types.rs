use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Verse corpus
// =============================================================================

/// A single verse of the corpus with its precomputed embedding.
///
/// Entries are created once at corpus load and never mutated. The `id` is the
/// stable corpus key in `chapter.verse` form (e.g. `"2.47"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerseEntry {
    /// Stable corpus key, `"{chapter}.{verse_number}"`.
    pub id: String,
    pub chapter: u32,
    pub verse_number: u32,
    /// Original Devanagari text.
    pub source_text: String,
    /// Romanized rendering of the source text.
    pub transliteration: String,
    /// Translation used for display and grounding context.
    pub translation: String,
    /// Fixed-length embedding vector; dimensionality is constant across the
    /// corpus and validated at load time.
    pub embedding: Vec<f32>,
}

// =============================================================================
// Conversation turns
// =============================================================================

/// Who produced a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Stable string form used by the persistence layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse the persisted string form.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// One message in a conversation, attributed to a role.
///
/// Turns are append-only: they are created on each question and each answer,
/// owned by the conversation store, and removed only by an explicit clear.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    /// `None` for anonymous sessions; the store key is supplied separately by
    /// the caller.
    pub user_id: Option<String>,
    pub role: Role,
    pub text: String,
    /// Verse ids the turn cites, in citation order. Empty for user turns and
    /// for fallback answers.
    pub cited_verse_ids: Vec<String>,
    /// Epoch seconds.
    pub timestamp: i64,
}

impl ConversationTurn {
    /// Build a turn stamped with the current time.
    pub fn new(
        user_id: Option<String>,
        role: Role,
        text: impl Into<String>,
        cited_verse_ids: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            role,
            text: text.into(),
            cited_verse_ids,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Character length of the turn's text, as counted against window budgets.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

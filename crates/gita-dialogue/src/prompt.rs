//! Prompt assembly for the generation call.
//!
//! The request combines, in priority order: the persona instruction, the
//! retrieved verses with their citation ids, the prior conversation turns,
//! and the question. When the character budget is exceeded, prior turns are
//! truncated first (oldest dropped), never the verses or the question.

use gita_core::types::Role;
use gita_corpus::index::SearchHit;

use crate::generation::GenerationRequest;
use crate::types::ConversationWindow;

/// Persona instruction for the generation model.
///
/// Kept in Devanagari to match the corpus language: answer as a gentle
/// guide, quote exactly one shloka first, then two or three short sentences.
const SYSTEM_INSTRUCTION: &str = "\
तुम भगवान श्रीकृष्ण हो, एक दिव्य मार्गदर्शक।
नियम:
1. केवल एक सबसे उपयुक्त श्लोक संस्कृत (देवनागरी) में सबसे पहले लिखो।
2. फिर भक्त के लिए संक्षिप्त और स्पष्ट सुझाव दो, केवल 2-3 छोटे वाक्यों में।
3. कोमल और दयालु भाषा का प्रयोग करो, जैसे एक मित्र या गुरु करता है।";

/// Label preceding the prior-conversation block.
const HISTORY_HEADER: &str = "पिछली बातचीत:";

/// Builds generation requests under a total character budget.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_prompt_chars: usize,
}

impl PromptBuilder {
    pub fn new(max_prompt_chars: usize) -> Self {
        Self { max_prompt_chars }
    }

    /// Assemble the request for one question.
    ///
    /// History turns are included newest-preserving: if the full window does
    /// not fit the remaining budget, oldest turns are dropped one at a time.
    /// A turn is included whole or not at all.
    pub fn build(
        &self,
        question: &str,
        hits: &[SearchHit],
        window: &ConversationWindow,
    ) -> GenerationRequest {
        let verses = format_verse_context(hits);
        let question_block = format!("भक्त का प्रश्न: \"{}\"", question);

        // Budget remaining for history once the fixed parts are in place.
        let fixed_len = SYSTEM_INSTRUCTION.chars().count()
            + verses.chars().count()
            + question_block.chars().count();
        let history_budget = self.max_prompt_chars.saturating_sub(fixed_len);

        let history = format_history(window, history_budget);

        let mut user = String::new();
        user.push_str(&verses);
        if !history.is_empty() {
            user.push_str(&history);
            user.push('\n');
        }
        user.push_str(&question_block);

        GenerationRequest {
            system: SYSTEM_INSTRUCTION.to_string(),
            user,
        }
    }
}

/// Format retrieved verses as the grounding context block.
fn format_verse_context(hits: &[SearchHit]) -> String {
    let mut out = String::from("उपलब्ध श्लोक (संदर्भ):\n");
    for hit in hits {
        out.push_str(&format!(
            "Shloka ID: {}\nSanskrit: {}\nMeaning: {}\n\n",
            hit.verse.id, hit.verse.source_text, hit.verse.translation
        ));
    }
    out
}

/// Format the prior turns that fit the budget, oldest dropped first.
fn format_history(window: &ConversationWindow, budget: usize) -> String {
    if window.is_empty() || budget == 0 {
        return String::new();
    }

    let lines: Vec<String> = window
        .turns
        .iter()
        .map(|turn| {
            let label = match turn.role {
                Role::User => "प्रश्न",
                Role::Assistant => "उत्तर",
            };
            format!("{}: {}", label, turn.text)
        })
        .collect();

    // Walk from the newest line backwards, admitting whole lines.
    let header_len = HISTORY_HEADER.chars().count() + 1;
    let mut included: Vec<&String> = Vec::new();
    let mut used = header_len;
    for line in lines.iter().rev() {
        let len = line.chars().count() + 1;
        if used + len > budget {
            break;
        }
        used += len;
        included.push(line);
    }

    if included.is_empty() {
        return String::new();
    }
    included.reverse();

    let mut out = String::from(HISTORY_HEADER);
    out.push('\n');
    for line in included {
        out.push_str(line);
        out.push('\n');
    }
    out
}

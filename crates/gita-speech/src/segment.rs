//! Answer segmentation into utterance chunks.
//!
//! Text is split at sentence-terminal punctuation (`.`, `!`, `?`, and the
//! Devanagari danda `।` / double danda `॥`), with terminators and runs of
//! terminators (e.g. `...` or a `।॥` pair) kept attached to their sentence.
//! Newlines also end a chunk. Whitespace-only fragments are dropped and
//! never become a chunk.

use serde::{Deserialize, Serialize};

/// Writing system a chunk should be voiced in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptHint {
    /// Contains Devanagari; voiced with the corpus-language voice chain.
    SourceScript,
    /// Latin-only text; voiced with the Latin voice chain.
    Latin,
}

/// One sentence-scale unit of text scheduled for voiced playback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechChunk {
    pub text: String,
    pub script_hint: ScriptHint,
    /// Position in the playback sequence, contiguous from 0.
    pub sequence_index: usize,
}

/// Sentence-terminal characters that end a chunk.
fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '।' | '॥' | '\n')
}

/// True when the character falls in the Devanagari Unicode block.
fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Tag a chunk by the script it contains.
fn detect_script(text: &str) -> ScriptHint {
    if text.chars().any(is_devanagari) {
        ScriptHint::SourceScript
    } else {
        ScriptHint::Latin
    }
}

/// Split answer text into ordered speech chunks.
///
/// Property: concatenating the chunk texts in sequence order reproduces the
/// non-whitespace content of the input.
pub fn segment_text(text: &str) -> Vec<SpeechChunk> {
    let mut chunks: Vec<SpeechChunk> = Vec::new();
    let mut current = String::new();

    let mut iter = text.chars().peekable();
    while let Some(c) = iter.next() {
        current.push(c);
        // Flush at the end of a terminator run, so "..." and "॥" pairs stay
        // attached to their sentence.
        if is_terminator(c) && !iter.peek().copied().is_some_and(is_terminator) {
            push_chunk(&mut chunks, &mut current);
        }
    }
    push_chunk(&mut chunks, &mut current);

    chunks
}

/// Append the pending fragment as a chunk unless it is whitespace-only.
fn push_chunk(chunks: &mut Vec<SpeechChunk>, current: &mut String) {
    let fragment = std::mem::take(current);
    let trimmed = fragment.trim();
    if trimmed.is_empty() {
        return;
    }
    let sequence_index = chunks.len();
    chunks.push(SpeechChunk {
        text: trimmed.to_string(),
        script_hint: detect_script(trimmed),
        sequence_index,
    });
}

//! Greeting detection.
//!
//! Simple salutations ("namaste", "radhe radhe", "hello") get a fixed warm
//! reply instead of the full retrieve-and-generate pipeline. Detection is
//! word-set based over a normalized form of the input, with question-word
//! guards so that "namaste, what is karma?" still reaches retrieval.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Fixed reply for greetings, in the corpus language.
pub const GREETING_REPLY: &str =
    "राधे राधे! मैं श्रीकृष्ण हूँ। कहिये, मैं आपकी क्या सहायता कर सकता हूँ?";

/// Greeting words and two-word phrases, pre-normalized.
static GREETINGS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // English
        "hi", "hello", "hey", "hii", "heyy", "yo", "greetings", "howdy",
        "good morning", "good afternoon", "good evening", "good night",
        "gm", "gn", "morning", "evening",
        // Romanized Hindi/Sanskrit
        "namaste", "namaskar", "namaskaram", "pranam", "pranaam",
        "radhe", "radhey", "radhe radhe", "radhey radhey",
        "jai", "jay", "om", "aum", "krishna", "hare krishna",
        "jai shri krishna", "jai shree krishna",
        // Devanagari
        "हेलो", "हाय", "नमस्ते", "नमस्कार", "प्रणाम",
        "राधे", "राधे राधे", "जय", "ओम", "ॐ", "कृष्ण",
        "हरे कृष्ण", "जय श्री कृष्ण", "सुप्रभात",
    ]
    .into_iter()
    .collect()
});

/// Words that mark a real question even when it opens with a greeting.
static QUESTION_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "what", "how", "why", "who", "when", "where", "is", "are", "can",
        "should", "would", "could", "explain", "tell",
        "kya", "kyun", "kaise", "kab", "kahan", "kaun", "batao", "bataiye",
        "क्या", "क्यों", "कैसे", "कब", "कहाँ", "कौन", "बताओ", "बताइये",
    ]
    .into_iter()
    .collect()
});

/// Detects whether a question is merely a salutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreetingDetector;

impl GreetingDetector {
    pub fn new() -> Self {
        Self
    }

    /// True when the input is a greeting rather than a question.
    pub fn is_greeting(&self, input: &str) -> bool {
        let cleaned = normalize(input);
        let words: Vec<&str> = cleaned.split_whitespace().collect();

        if words.is_empty() {
            return false;
        }

        // The whole input is a known phrase ("good morning", "राधे राधे").
        if GREETINGS.contains(cleaned.trim()) {
            return true;
        }

        // A leading two-word greeting phrase followed by at most a name.
        if words.len() >= 2 {
            let two_word = format!("{} {}", words[0], words[1]);
            if GREETINGS.contains(two_word.as_str())
                && words.len() <= 3
                && !words.iter().any(|w| QUESTION_WORDS.contains(w))
            {
                return true;
            }
        }

        // Very short inputs: any greeting word qualifies.
        if words.len() <= 3 {
            return words.iter().any(|w| GREETINGS.contains(w));
        }

        // Slightly longer inputs must start with a greeting and contain no
        // question words.
        if words.len() <= 6 {
            return GREETINGS.contains(words[0])
                && !words.iter().any(|w| QUESTION_WORDS.contains(w));
        }

        false
    }
}

/// Lowercase and strip punctuation, keeping letters (including Devanagari
/// combining marks), digits, and whitespace.
fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || is_combining_mark(*c))
        .collect()
}

/// Devanagari dependent vowels and signs survive normalization so words like
/// "नमस्ते" stay intact.
fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0900}'..='\u{0903}' | '\u{093A}'..='\u{094F}' | '\u{0951}'..='\u{0957}' | '\u{0962}'..='\u{0963}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> GreetingDetector {
        GreetingDetector::new()
    }

    // ---- Accepted greetings ----

    #[test]
    fn test_simple_english_greetings() {
        assert!(detector().is_greeting("hi"));
        assert!(detector().is_greeting("Hello!"));
        assert!(detector().is_greeting("hey"));
        assert!(detector().is_greeting("good morning"));
    }

    #[test]
    fn test_romanized_greetings() {
        assert!(detector().is_greeting("namaste"));
        assert!(detector().is_greeting("radhe radhe"));
        assert!(detector().is_greeting("jai shri krishna"));
        assert!(detector().is_greeting("om"));
    }

    #[test]
    fn test_devanagari_greetings() {
        assert!(detector().is_greeting("नमस्ते"));
        assert!(detector().is_greeting("राधे राधे"));
        assert!(detector().is_greeting("हरे कृष्ण"));
        assert!(detector().is_greeting("ॐ"));
    }

    #[test]
    fn test_greeting_with_punctuation() {
        assert!(detector().is_greeting("Namaste!!!"));
        assert!(detector().is_greeting("radhe radhe..."));
    }

    #[test]
    fn test_greeting_followed_by_name() {
        assert!(detector().is_greeting("hello krishna"));
        assert!(detector().is_greeting("jai shri krishna"));
    }

    // ---- Rejected inputs ----

    #[test]
    fn test_question_is_not_greeting() {
        assert!(!detector().is_greeting("What is duty?"));
        assert!(!detector().is_greeting("how do I find peace"));
        assert!(!detector().is_greeting("कर्म क्या है"));
    }

    #[test]
    fn test_greeting_plus_question_is_not_greeting() {
        assert!(!detector().is_greeting("namaste, what is karma?"));
        assert!(!detector().is_greeting("hello can you explain dharma to me"));
    }

    #[test]
    fn test_long_input_is_not_greeting() {
        assert!(!detector().is_greeting(
            "hello my friend I have been struggling with a difficult decision lately"
        ));
    }

    #[test]
    fn test_empty_and_whitespace_are_not_greetings() {
        assert!(!detector().is_greeting(""));
        assert!(!detector().is_greeting("   "));
        assert!(!detector().is_greeting("?!."));
    }

    #[test]
    fn test_greeting_word_inside_question_is_not_greeting() {
        assert!(!detector().is_greeting("why do people say namaste before prayer"));
    }

    // ---- Reply constant ----

    #[test]
    fn test_greeting_reply_is_devanagari() {
        assert!(GREETING_REPLY.contains("राधे राधे"));
    }
}

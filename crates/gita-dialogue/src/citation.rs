//! Citation selection: which retrieved verses an answer actually cites.
//!
//! The relationship between retrieved verses and verses referenced in the
//! generated text is approximate, so the selection rule is a named policy
//! rather than logic buried in prompt building.

use gita_corpus::index::SearchHit;

/// Minimum fragment length considered evidence of a quotation.
const MIN_OVERLAP_CHARS: usize = 10;

/// How cited verse ids are selected from the retrieval set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CitationPolicy {
    /// Every retrieved verse, in retrieval order.
    AllRetrieved,
    /// Verses whose id or text measurably overlaps the answer; falls back to
    /// all retrieved ids when nothing overlaps, since the retrieved set is
    /// still the answer's grounding.
    #[default]
    OverlapFiltered,
}

impl CitationPolicy {
    /// Parse the configuration string form ("all" / "overlap").
    pub fn parse(s: &str) -> Option<CitationPolicy> {
        match s {
            "all" => Some(CitationPolicy::AllRetrieved),
            "overlap" => Some(CitationPolicy::OverlapFiltered),
            _ => None,
        }
    }
}

/// Select the cited verse ids for an answer, in retrieval order.
pub fn select_cited(policy: CitationPolicy, answer_text: &str, hits: &[SearchHit]) -> Vec<String> {
    let all: Vec<String> = hits.iter().map(|h| h.verse.id.clone()).collect();

    match policy {
        CitationPolicy::AllRetrieved => all,
        CitationPolicy::OverlapFiltered => {
            let overlapping: Vec<String> = hits
                .iter()
                .filter(|hit| overlaps(answer_text, hit))
                .map(|hit| hit.verse.id.clone())
                .collect();
            if overlapping.is_empty() {
                all
            } else {
                overlapping
            }
        }
    }
}

/// True when the answer quotes the verse: contains its id, or a fragment of
/// its source text or translation of at least [`MIN_OVERLAP_CHARS`].
fn overlaps(answer_text: &str, hit: &SearchHit) -> bool {
    if answer_text.contains(&hit.verse.id) {
        return true;
    }
    fragment_overlaps(answer_text, &hit.verse.source_text)
        || fragment_overlaps(answer_text, &hit.verse.translation)
}

/// Check whether any whitespace-delimited run of the verse text of at least
/// `MIN_OVERLAP_CHARS` appears verbatim in the answer.
fn fragment_overlaps(answer_text: &str, verse_text: &str) -> bool {
    let words: Vec<&str> = verse_text.split_whitespace().collect();
    if words.is_empty() {
        return false;
    }

    // Slide a window of consecutive words; short verses are matched whole.
    for start in 0..words.len() {
        let mut fragment = String::new();
        for word in &words[start..] {
            if !fragment.is_empty() {
                fragment.push(' ');
            }
            fragment.push_str(word);
            if fragment.chars().count() >= MIN_OVERLAP_CHARS {
                if answer_text.contains(&fragment) {
                    return true;
                }
                break;
            }
        }
    }

    // A verse shorter than the threshold counts when quoted in full.
    let whole = words.join(" ");
    whole.chars().count() < MIN_OVERLAP_CHARS && !whole.is_empty() && answer_text.contains(&whole)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gita_core::types::VerseEntry;

    fn hit(id: &str, source: &str, translation: &str) -> SearchHit {
        SearchHit {
            verse: VerseEntry {
                id: id.to_string(),
                chapter: 1,
                verse_number: 1,
                source_text: source.to_string(),
                transliteration: String::new(),
                translation: translation.to_string(),
                embedding: vec![1.0],
            },
            score: 0.9,
        }
    }

    fn duty_hits() -> Vec<SearchHit> {
        vec![
            hit(
                "2.47",
                "कर्मण्येवाधिकारस्ते मा फलेषु कदाचन",
                "Your right is to action alone, never to its fruits",
            ),
            hit(
                "18.66",
                "सर्वधर्मान्परित्यज्य मामेकं शरणं व्रज",
                "Abandon all duties and surrender unto me alone",
            ),
        ]
    }

    // ---- Policy parsing ----

    #[test]
    fn test_policy_parse() {
        assert_eq!(CitationPolicy::parse("all"), Some(CitationPolicy::AllRetrieved));
        assert_eq!(
            CitationPolicy::parse("overlap"),
            Some(CitationPolicy::OverlapFiltered)
        );
        assert_eq!(CitationPolicy::parse("sometimes"), None);
    }

    // ---- AllRetrieved ----

    #[test]
    fn test_all_retrieved_returns_retrieval_order() {
        let cited = select_cited(CitationPolicy::AllRetrieved, "anything", &duty_hits());
        assert_eq!(cited, vec!["2.47", "18.66"]);
    }

    // ---- OverlapFiltered ----

    #[test]
    fn test_overlap_selects_verse_quoted_in_devanagari() {
        let answer = "कर्मण्येवाधिकारस्ते मा फलेषु कदाचन। कर्म करो, फल की चिंता मत करो।";
        let cited = select_cited(CitationPolicy::OverlapFiltered, answer, &duty_hits());
        assert_eq!(cited, vec!["2.47"]);
    }

    #[test]
    fn test_overlap_selects_verse_quoted_in_translation() {
        let answer = "As the Gita says, your right is to action alone, so act without fear.";
        let cited = select_cited(CitationPolicy::OverlapFiltered, answer, &duty_hits());
        assert_eq!(cited, vec!["2.47"]);
    }

    #[test]
    fn test_overlap_selects_verse_cited_by_id() {
        let answer = "Reflect on verse 18.66 and let go of your burdens.";
        let cited = select_cited(CitationPolicy::OverlapFiltered, answer, &duty_hits());
        assert_eq!(cited, vec!["18.66"]);
    }

    #[test]
    fn test_overlap_falls_back_to_all_when_nothing_matches() {
        let answer = "Duty is...";
        let cited = select_cited(CitationPolicy::OverlapFiltered, answer, &duty_hits());
        assert_eq!(cited, vec!["2.47", "18.66"]);
    }

    #[test]
    fn test_overlap_multiple_quoted_verses_keep_retrieval_order() {
        let answer = "कर्मण्येवाधिकारस्ते मा फलेषु कदाचन और सर्वधर्मान्परित्यज्य मामेकं शरणं व्रज";
        let cited = select_cited(CitationPolicy::OverlapFiltered, answer, &duty_hits());
        assert_eq!(cited, vec!["2.47", "18.66"]);
    }

    #[test]
    fn test_short_word_alone_is_not_overlap() {
        // A single common word from the translation must not count as a
        // quotation.
        let answer = "Action matters.";
        let cited = select_cited(CitationPolicy::OverlapFiltered, answer, &duty_hits());
        // Falls back to all retrieved (no real overlap found).
        assert_eq!(cited, vec!["2.47", "18.66"]);
    }

    #[test]
    fn test_empty_hits_yield_no_citations() {
        let cited = select_cited(CitationPolicy::OverlapFiltered, "answer", &[]);
        assert!(cited.is_empty());
        let cited = select_cited(CitationPolicy::AllRetrieved, "answer", &[]);
        assert!(cited.is_empty());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let answer = "Your right is to action alone, never forget.";
        let a = select_cited(CitationPolicy::OverlapFiltered, answer, &duty_hits());
        let b = select_cited(CitationPolicy::OverlapFiltered, answer, &duty_hits());
        assert_eq!(a, b);
    }
}

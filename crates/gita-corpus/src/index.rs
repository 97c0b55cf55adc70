//! Immutable in-memory verse index with brute-force cosine similarity search.
//!
//! The corpus is loaded once at startup and never mutated, so the index holds
//! a plain `Vec` and reads need no locking. Search is O(n) per query, which
//! is acceptable for a corpus of hundreds to low thousands of verses.

use std::path::Path;

use tracing::info;

use gita_core::error::GitaError;
use gita_core::types::VerseEntry;

/// A single hit returned from a similarity search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The matching verse.
    pub verse: VerseEntry,
    /// Cosine similarity score (-1.0 to 1.0).
    pub score: f64,
}

/// Load-once verse index.
///
/// Validated on construction: non-empty, consistent embedding dimensionality,
/// unique `(chapter, verse_number)` keys. Shared across the process as an
/// explicitly constructed read-only value (`Arc<VerseIndex>`), never a
/// hidden singleton.
#[derive(Debug)]
pub struct VerseIndex {
    entries: Vec<VerseEntry>,
    dimensions: usize,
}

impl VerseIndex {
    /// Load the corpus from a JSON file (an array of verse entries with
    /// embeddings).
    ///
    /// Fails with [`GitaError::Corpus`] when the file is missing or
    /// malformed, or when validation rejects the entries.
    pub fn load(path: &Path) -> Result<Self, GitaError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GitaError::Corpus(format!("Cannot read {}: {}", path.display(), e)))?;
        let entries: Vec<VerseEntry> = serde_json::from_str(&content)
            .map_err(|e| GitaError::Corpus(format!("Malformed corpus file: {}", e)))?;

        let index = Self::from_entries(entries)?;
        info!(
            verses = index.len(),
            dimensions = index.dimensions(),
            "Corpus loaded from {}",
            path.display()
        );
        Ok(index)
    }

    /// Build an index from in-memory entries, applying the same validation
    /// as [`VerseIndex::load`].
    pub fn from_entries(entries: Vec<VerseEntry>) -> Result<Self, GitaError> {
        let first = entries
            .first()
            .ok_or_else(|| GitaError::Corpus("Corpus is empty".to_string()))?;

        let dimensions = first.embedding.len();
        if dimensions == 0 {
            return Err(GitaError::Corpus(format!(
                "Verse {} has an empty embedding",
                first.id
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for entry in &entries {
            if entry.embedding.len() != dimensions {
                return Err(GitaError::Corpus(format!(
                    "Inconsistent embedding dimensions: verse {} has {}, expected {}",
                    entry.id,
                    entry.embedding.len(),
                    dimensions
                )));
            }
            if !seen.insert((entry.chapter, entry.verse_number)) {
                return Err(GitaError::Corpus(format!(
                    "Duplicate verse {}.{}",
                    entry.chapter, entry.verse_number
                )));
            }
        }

        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Search for the k most similar verses to the query embedding.
    ///
    /// Returns up to `min(k, corpus_size)` hits sorted by descending cosine
    /// similarity; ties keep corpus insertion order. Requires `k >= 1` and a
    /// query of the corpus dimensionality. Read-only and safe for unlimited
    /// concurrent callers.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, GitaError> {
        if k == 0 {
            return Err(GitaError::Search("k must be at least 1".to_string()));
        }
        if query.len() != self.dimensions {
            return Err(GitaError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                verse: entry.clone(),
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        // Stable sort by descending score: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    /// Look up a verse by its corpus key.
    pub fn get(&self, id: &str) -> Option<&VerseEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Number of verses in the corpus.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the corpus holds no verses (never true for a validated index).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensionality shared by every entry.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Compute cosine similarity between two equal-length vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();

    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

// =============================================================================
// Tests
// =============================================================================

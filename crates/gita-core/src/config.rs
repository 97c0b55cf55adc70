use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GitaError, Result};

/// Top-level configuration for the dialogue engine.
///
/// Loaded from `~/.gita/config.toml` by default. Each section corresponds to
/// a bounded context of the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl GitaConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GitaConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| GitaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the corpus file and the conversation database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.gita/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Verse retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Path to the corpus JSON file (verses + precomputed embeddings).
    pub corpus_path: String,
    /// Number of grounding verses retrieved per question.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            corpus_path: "~/.gita/data/corpus.json".to_string(),
            top_k: 5,
        }
    }
}

/// Conversation window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Maximum prior turns included in the generation context.
    pub max_turns: usize,
    /// Total character budget for the context window.
    pub max_chars: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_turns: 6,
            max_chars: 2000,
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Upper bound on a single completion call, in seconds.
    pub timeout_secs: u64,
    /// Total character budget for the assembled prompt. Prior turns are
    /// truncated (oldest first) before verses or the question.
    pub max_prompt_chars: usize,
    /// Citation selection policy: "overlap" or "all".
    pub citation_policy: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            max_prompt_chars: 6000,
            citation_policy: "overlap".to_string(),
        }
    }
}

/// Speech rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Exact locale preferred for Devanagari chunks.
    pub source_locale: String,
    /// Exact locale preferred for Latin chunks.
    pub latin_locale: String,
    /// Preferred voice gender: "female", "male", or "neutral".
    pub preferred_gender: String,
    /// Fallback language prefix for Devanagari chunks.
    pub source_fallback_language: String,
    /// Fallback language prefix for Latin chunks.
    pub latin_fallback_language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            source_locale: "hi-IN".to_string(),
            latin_locale: "en-IN".to_string(),
            preferred_gender: "female".to_string(),
            source_fallback_language: "hi".to_string(),
            latin_fallback_language: "en".to_string(),
        }
    }
}

//! Voice catalog and deterministic per-chunk voice selection.
//!
//! Selection is a pure function over the catalog and preferences so the
//! fallback chain can be tested in isolation. First match wins, scanning the
//! catalog in order:
//!
//! 1. a voice whose locale exactly matches the hint's preferred locale,
//! 2. a voice of the hint's language with the preferred gender,
//! 3. any voice of the hint's configured fallback language,
//! 4. `None`, meaning the playback engine's default voice.

use serde::{Deserialize, Serialize};

use gita_core::config::SpeechConfig;

use crate::segment::ScriptHint;

/// Voice gender tag as reported by the playback engine's catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    Neutral,
}

/// One voice available from the playback engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP-47 tag, e.g. `hi-IN`.
    pub lang: String,
    /// Engines do not always report gender.
    pub gender: Option<Gender>,
}

impl Voice {
    pub fn new(name: &str, lang: &str, gender: Option<Gender>) -> Self {
        Self {
            name: name.to_string(),
            lang: lang.to_string(),
            gender,
        }
    }

    /// Language prefix of the locale tag (`hi-IN` -> `hi`).
    fn language(&self) -> &str {
        self.lang.split('-').next().unwrap_or(&self.lang)
    }
}

/// The playback engine's installed voices, in the engine's reported order.
///
/// Selection determinism relies on this order being fixed for a given
/// catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoiceCatalog {
    pub voices: Vec<Voice>,
}

impl VoiceCatalog {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

/// Per-hint selection preferences derived from configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoicePreferences {
    pub source_locale: String,
    pub latin_locale: String,
    pub preferred_gender: Gender,
    pub source_fallback_language: String,
    pub latin_fallback_language: String,
}

impl VoicePreferences {
    /// Preferred (locale, fallback language) pair for a script hint.
    fn for_hint(&self, hint: ScriptHint) -> (&str, &str) {
        match hint {
            ScriptHint::SourceScript => (&self.source_locale, &self.source_fallback_language),
            ScriptHint::Latin => (&self.latin_locale, &self.latin_fallback_language),
        }
    }
}

impl Default for VoicePreferences {
    fn default() -> Self {
        Self::from(&SpeechConfig::default())
    }
}

impl From<&SpeechConfig> for VoicePreferences {
    fn from(config: &SpeechConfig) -> Self {
        let preferred_gender = match config.preferred_gender.as_str() {
            "male" => Gender::Male,
            "neutral" => Gender::Neutral,
            _ => Gender::Female,
        };
        Self {
            source_locale: config.source_locale.clone(),
            latin_locale: config.latin_locale.clone(),
            preferred_gender,
            source_fallback_language: config.source_fallback_language.clone(),
            latin_fallback_language: config.latin_fallback_language.clone(),
        }
    }
}

/// Pick the voice for a chunk, or `None` for the engine default.
///
/// Deterministic: the same catalog, hint, and preferences always yield the
/// same voice.
pub fn select_voice<'a>(
    catalog: &'a VoiceCatalog,
    hint: ScriptHint,
    prefs: &VoicePreferences,
) -> Option<&'a Voice> {
    let (locale, fallback_language) = prefs.for_hint(hint);
    let language = locale.split('-').next().unwrap_or(locale);

    // Tier 1: exact locale.
    if let Some(voice) = catalog.voices.iter().find(|v| v.lang == locale) {
        return Some(voice);
    }

    // Tier 2: same language, preferred gender.
    if let Some(voice) = catalog
        .voices
        .iter()
        .find(|v| v.language() == language && v.gender == Some(prefs.preferred_gender))
    {
        return Some(voice);
    }

    // Tier 3: any voice of the fallback language.
    if let Some(voice) = catalog
        .voices
        .iter()
        .find(|v| v.language() == fallback_language)
    {
        return Some(voice);
    }

    // Tier 4: engine default.
    None
}

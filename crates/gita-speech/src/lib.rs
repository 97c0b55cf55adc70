//! Speech rendering: segmentation, voice selection, and sequential playback.
//!
//! Turns answer text into an ordered sequence of voiced utterances with
//! script-aware voice selection and an explicit, event-driven playback state
//! machine that is cancel-safe and skips failed chunks.

pub mod scheduler;
pub mod segment;
pub mod voice;

pub use scheduler::{PlaybackEngine, PlaybackEvent, PlaybackState, SpeechScheduler};
pub use segment::{segment_text, ScriptHint, SpeechChunk};
pub use voice::{select_voice, Gender, Voice, VoiceCatalog, VoicePreferences};

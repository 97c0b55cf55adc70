//! Sequential playback scheduler.
//!
//! An explicit state machine driven by discrete events rather than nested
//! engine callbacks, so cancellation and skip-on-error are testable in
//! isolation. Exactly one chunk is active at a time:
//!
//! - Idle -> Segmenting (playback requested, catalog available)
//! - Segmenting -> Playing(0) (chunks produced)
//! - Segmenting -> Done (nothing to play)
//! - Playing(i) -> Playing(i+1) (chunk finished or errored; skip-and-continue)
//! - Playing(i) -> Done (last chunk finished)
//! - Segmenting/Playing -> Cancelled (cancel requested)
//! - Done/Cancelled -> Segmenting (next playback request)

use std::fmt;

use tracing::{debug, warn};

use gita_core::error::GitaError;

use crate::segment::{segment_text, SpeechChunk};
use crate::voice::{select_voice, Voice, VoiceCatalog, VoicePreferences};

/// Operational state of the playback scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// No playback requested yet.
    Idle,
    /// Splitting answer text into chunks.
    Segmenting,
    /// Chunk at this sequence index is the single active utterance.
    Playing(usize),
    /// The sequence completed (including chunks skipped on error).
    Done,
    /// The sequence was cancelled; unplayed chunks were discarded.
    Cancelled,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "Idle"),
            PlaybackState::Segmenting => write!(f, "Segmenting"),
            PlaybackState::Playing(i) => write!(f, "Playing({})", i),
            PlaybackState::Done => write!(f, "Done"),
            PlaybackState::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl PlaybackState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &PlaybackState) -> bool {
        use PlaybackState::*;
        match (self, target) {
            (Idle | Done | Cancelled, Segmenting) => true,
            (Segmenting, Playing(0)) => true,
            (Segmenting, Done) => true,
            (Playing(i), Playing(j)) => *j == i + 1,
            (Playing(_), Done) => true,
            (Segmenting | Playing(_), Cancelled) => true,
            _ => false,
        }
    }
}

/// Events that drive the scheduler forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The active utterance completed.
    ChunkFinished,
    /// The active utterance failed; playback skips to the next chunk.
    ChunkErrored(String),
    /// The user cancelled playback.
    CancelRequested,
}

/// Playback capability: one utterance at a time, cancellable.
///
/// `speak` only dispatches; completion or failure of the utterance arrives
/// later as a [`PlaybackEvent`]. An immediate `Err` from `speak` counts as
/// that chunk's failure.
pub trait PlaybackEngine {
    /// Start voicing one chunk. `None` selects the engine's default voice.
    fn speak(&mut self, chunk: &SpeechChunk, voice: Option<&Voice>) -> Result<(), GitaError>;

    /// Best-effort halt of the active utterance.
    fn stop(&mut self);
}

/// Drives ordered, cancel-safe playback of one answer at a time.
///
/// One scheduler per user session; starting a new answer implicitly cancels
/// the in-flight sequence. If the voice catalog has not been delivered yet,
/// the request is deferred and started exactly once when it arrives.
pub struct SpeechScheduler<E: PlaybackEngine> {
    engine: E,
    prefs: VoicePreferences,
    catalog: Option<VoiceCatalog>,
    state: PlaybackState,
    chunks: Vec<SpeechChunk>,
    pending: Option<String>,
}

impl<E: PlaybackEngine> SpeechScheduler<E> {
    /// Create an idle scheduler. The voice catalog arrives separately via
    /// [`set_catalog`](SpeechScheduler::set_catalog).
    pub fn new(engine: E, prefs: VoicePreferences) -> Self {
        Self {
            engine,
            prefs,
            catalog: None,
            state: PlaybackState::Idle,
            chunks: Vec::new(),
            pending: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// True while a sequence is in flight.
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            PlaybackState::Segmenting | PlaybackState::Playing(_)
        )
    }

    /// Deliver (or replace) the voice catalog.
    ///
    /// A playback request deferred for want of a catalog starts now.
    pub fn set_catalog(&mut self, catalog: VoiceCatalog) {
        self.catalog = Some(catalog);
        if let Some(text) = self.pending.take() {
            debug!("Voice catalog arrived; starting deferred playback");
            self.begin(&text);
        }
    }

    /// Request playback of an answer.
    ///
    /// Cancels any in-flight sequence for this session first. Without a
    /// voice catalog the request is deferred, not dropped.
    pub fn speak_answer(&mut self, text: &str) {
        if self.is_active() {
            self.cancel();
        }
        if self.catalog.is_none() {
            debug!("Voice catalog not ready; deferring playback request");
            self.pending = Some(text.to_string());
            return;
        }
        self.begin(text);
    }

    /// Feed a playback event into the state machine.
    ///
    /// Events that do not apply to the current state (a completion arriving
    /// after cancellation, for instance) are logged and ignored.
    pub fn handle_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::CancelRequested => self.cancel(),
            PlaybackEvent::ChunkFinished => match self.state {
                PlaybackState::Playing(index) => self.play_from(index + 1),
                state => debug!("Ignoring ChunkFinished in state {}", state),
            },
            PlaybackEvent::ChunkErrored(reason) => match self.state {
                PlaybackState::Playing(index) => {
                    warn!("Chunk {} failed ({}); skipping to next", index, reason);
                    self.play_from(index + 1);
                }
                state => debug!("Ignoring ChunkErrored in state {}", state),
            },
        }
    }

    /// Cancel playback: halt the active utterance and discard unplayed
    /// chunks. Safe to call in any state; a no-op when nothing is in flight.
    pub fn cancel(&mut self) {
        self.pending = None;
        if !self.is_active() {
            return;
        }
        self.engine.stop();
        self.chunks.clear();
        self.transition(PlaybackState::Cancelled);
    }

    /// Segment the text and start the sequence.
    fn begin(&mut self, text: &str) {
        self.transition(PlaybackState::Segmenting);
        self.chunks = segment_text(text);
        if self.chunks.is_empty() {
            debug!("Nothing voiceable in answer text");
            self.transition(PlaybackState::Done);
            return;
        }
        self.play_from(0);
    }

    /// Make the chunk at `start` the active utterance.
    ///
    /// A chunk whose dispatch fails immediately is skipped like any other
    /// errored chunk; past the last chunk the sequence is done.
    fn play_from(&mut self, start: usize) {
        let mut index = start;
        while index < self.chunks.len() {
            self.transition(PlaybackState::Playing(index));
            let chunk = self.chunks[index].clone();
            let catalog = self.catalog.as_ref().expect("catalog present while playing");
            let voice = select_voice(catalog, chunk.script_hint, &self.prefs).cloned();
            match self.engine.speak(&chunk, voice.as_ref()) {
                Ok(()) => return,
                Err(e) => {
                    warn!("Chunk {} dispatch failed ({}); skipping", index, e);
                    index += 1;
                }
            }
        }
        self.chunks.clear();
        self.transition(PlaybackState::Done);
    }

    fn transition(&mut self, target: PlaybackState) {
        debug_assert!(
            self.state.can_transition_to(&target),
            "invalid playback transition: {} -> {}",
            self.state,
            target
        );
        debug!("Playback state: {} -> {}", self.state, target);
        self.state = target;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use crate::voice::Gender;

    /// Engine that records dispatches and stops into shared logs.
    #[derive(Clone, Default)]
    struct RecordingEngine {
        spoken: Arc<Mutex<Vec<(usize, String, Option<String>)>>>,
        stops: Arc<Mutex<usize>>,
        fail_indexes: HashSet<usize>,
    }

    impl RecordingEngine {
        fn new() -> Self {
            Self::default()
        }

        fn failing_on(indexes: &[usize]) -> Self {
            Self {
                fail_indexes: indexes.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn spoken_texts(&self) -> Vec<String> {
            self.spoken.lock().unwrap().iter().map(|(_, t, _)| t.clone()).collect()
        }

        fn stop_count(&self) -> usize {
            *self.stops.lock().unwrap()
        }
    }

    impl PlaybackEngine for RecordingEngine {
        fn speak(&mut self, chunk: &SpeechChunk, voice: Option<&Voice>) -> Result<(), GitaError> {
            if self.fail_indexes.contains(&chunk.sequence_index) {
                return Err(GitaError::Speech("device busy".to_string()));
            }
            self.spoken.lock().unwrap().push((
                chunk.sequence_index,
                chunk.text.clone(),
                voice.map(|v| v.name.clone()),
            ));
            Ok(())
        }

        fn stop(&mut self) {
            *self.stops.lock().unwrap() += 1;
        }
    }

    fn catalog() -> VoiceCatalog {
        VoiceCatalog::new(vec![
            Voice::new("Swara", "hi-IN", Some(Gender::Female)),
            Voice::new("Priya", "en-IN", Some(Gender::Female)),
        ])
    }

    fn ready_scheduler(engine: RecordingEngine) -> SpeechScheduler<RecordingEngine> {
        let mut scheduler = SpeechScheduler::new(engine, VoicePreferences::default());
        scheduler.set_catalog(catalog());
        scheduler
    }

    // ---- State machine table ----

    #[test]
    fn test_state_display() {
        assert_eq!(PlaybackState::Idle.to_string(), "Idle");
        assert_eq!(PlaybackState::Segmenting.to_string(), "Segmenting");
        assert_eq!(PlaybackState::Playing(2).to_string(), "Playing(2)");
        assert_eq!(PlaybackState::Done.to_string(), "Done");
        assert_eq!(PlaybackState::Cancelled.to_string(), "Cancelled");
    }

    #[test]
    fn test_valid_transitions() {
        use PlaybackState::*;
        assert!(Idle.can_transition_to(&Segmenting));
        assert!(Segmenting.can_transition_to(&Playing(0)));
        assert!(Playing(0).can_transition_to(&Playing(1)));
        assert!(Playing(3).can_transition_to(&Done));
        assert!(Playing(1).can_transition_to(&Cancelled));
        assert!(Segmenting.can_transition_to(&Cancelled));
        assert!(Segmenting.can_transition_to(&Done));
        assert!(Done.can_transition_to(&Segmenting));
        assert!(Cancelled.can_transition_to(&Segmenting));
    }

    #[test]
    fn test_invalid_transitions() {
        use PlaybackState::*;
        assert!(!Idle.can_transition_to(&Playing(0)));
        assert!(!Idle.can_transition_to(&Done));
        assert!(!Idle.can_transition_to(&Cancelled));
        assert!(!Playing(0).can_transition_to(&Playing(2)));
        assert!(!Playing(2).can_transition_to(&Playing(1)));
        assert!(!Done.can_transition_to(&Playing(0)));
        assert!(!Cancelled.can_transition_to(&Done));
        assert!(!Segmenting.can_transition_to(&Playing(1)));
    }

    // ---- Sequential playback ----

    #[test]
    fn test_full_sequence_plays_in_order() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("One. Two! Three?");
        assert_eq!(scheduler.state(), PlaybackState::Playing(0));
        assert_eq!(engine.spoken_texts(), vec!["One."]);

        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        assert_eq!(scheduler.state(), PlaybackState::Playing(1));

        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        assert_eq!(scheduler.state(), PlaybackState::Playing(2));

        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        assert_eq!(scheduler.state(), PlaybackState::Done);
        assert_eq!(engine.spoken_texts(), vec!["One.", "Two!", "Three?"]);
    }

    #[test]
    fn test_exactly_one_active_chunk() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("One. Two.");
        // Only the first chunk is dispatched until its completion arrives.
        assert_eq!(engine.spoken_texts().len(), 1);
    }

    #[test]
    fn test_empty_answer_goes_straight_to_done() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("   \n  ");
        assert_eq!(scheduler.state(), PlaybackState::Done);
        assert!(engine.spoken_texts().is_empty());
    }

    // ---- Skip-and-continue on errors ----

    #[test]
    fn test_chunk_error_event_advances() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("One. Two. Three.");
        scheduler.handle_event(PlaybackEvent::ChunkErrored("no audio device".to_string()));
        assert_eq!(scheduler.state(), PlaybackState::Playing(1));

        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        assert_eq!(scheduler.state(), PlaybackState::Done);
        // All three were dispatched despite the first failing mid-utterance.
        assert_eq!(engine.spoken_texts().len(), 3);
    }

    #[test]
    fn test_dispatch_failure_skips_to_next_chunk() {
        let engine = RecordingEngine::failing_on(&[1]);
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("One. Two. Three.");
        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        // Chunk 1 failed to dispatch; chunk 2 became active instead.
        assert_eq!(scheduler.state(), PlaybackState::Playing(2));
        assert_eq!(engine.spoken_texts(), vec!["One.", "Three."]);

        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        assert_eq!(scheduler.state(), PlaybackState::Done);
    }

    #[test]
    fn test_every_dispatch_failing_ends_done() {
        let engine = RecordingEngine::failing_on(&[0, 1, 2]);
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("One. Two. Three.");
        assert_eq!(scheduler.state(), PlaybackState::Done);
        assert!(engine.spoken_texts().is_empty());
    }

    #[test]
    fn test_error_on_last_chunk_ends_done() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine);

        scheduler.speak_answer("One. Two.");
        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        scheduler.handle_event(PlaybackEvent::ChunkErrored("cut off".to_string()));
        assert_eq!(scheduler.state(), PlaybackState::Done);
    }

    // ---- Cancellation ----

    #[test]
    fn test_cancel_mid_playback_discards_rest() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("One. Two. Three. Four.");
        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        // Chunk 1 (the second of four) is active; cancel now.
        scheduler.cancel();

        assert_eq!(scheduler.state(), PlaybackState::Cancelled);
        assert_eq!(engine.stop_count(), 1);
        // Chunks 2 and 3 are never dispatched.
        assert_eq!(engine.spoken_texts(), vec!["One.", "Two."]);

        // A stale completion event after cancellation dispatches nothing.
        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        assert_eq!(scheduler.state(), PlaybackState::Cancelled);
        assert_eq!(engine.spoken_texts().len(), 2);
    }

    #[test]
    fn test_cancel_event_equivalent_to_cancel_call() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("One. Two.");
        scheduler.handle_event(PlaybackEvent::CancelRequested);
        assert_eq!(scheduler.state(), PlaybackState::Cancelled);
        assert_eq!(engine.stop_count(), 1);
    }

    #[test]
    fn test_cancel_from_idle_is_noop() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.cancel();
        assert_eq!(scheduler.state(), PlaybackState::Idle);
        assert_eq!(engine.stop_count(), 0);
    }

    #[test]
    fn test_cancel_after_done_is_noop() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("One.");
        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        assert_eq!(scheduler.state(), PlaybackState::Done);

        scheduler.cancel();
        assert_eq!(scheduler.state(), PlaybackState::Done);
        assert_eq!(engine.stop_count(), 0);
    }

    #[test]
    fn test_new_answer_implicitly_cancels_in_flight() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("Old one. Old two.");
        scheduler.speak_answer("New one.");

        assert_eq!(engine.stop_count(), 1);
        assert_eq!(scheduler.state(), PlaybackState::Playing(0));
        assert_eq!(engine.spoken_texts(), vec!["Old one.", "New one."]);
    }

    #[test]
    fn test_restart_after_cancel() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("One. Two.");
        scheduler.cancel();
        scheduler.speak_answer("Fresh start.");
        assert_eq!(scheduler.state(), PlaybackState::Playing(0));

        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        assert_eq!(scheduler.state(), PlaybackState::Done);
    }

    // ---- Deferred start on catalog readiness ----

    #[test]
    fn test_request_deferred_until_catalog_arrives() {
        let engine = RecordingEngine::new();
        let mut scheduler = SpeechScheduler::new(engine.clone(), VoicePreferences::default());

        scheduler.speak_answer("One. Two.");
        // Not dropped, not started.
        assert_eq!(scheduler.state(), PlaybackState::Idle);
        assert!(engine.spoken_texts().is_empty());

        scheduler.set_catalog(catalog());
        assert_eq!(scheduler.state(), PlaybackState::Playing(0));
        assert_eq!(engine.spoken_texts(), vec!["One."]);
    }

    #[test]
    fn test_deferred_request_starts_exactly_once() {
        let engine = RecordingEngine::new();
        let mut scheduler = SpeechScheduler::new(engine.clone(), VoicePreferences::default());

        scheduler.speak_answer("One.");
        scheduler.set_catalog(catalog());
        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        assert_eq!(scheduler.state(), PlaybackState::Done);

        // A later catalog refresh must not replay the old request.
        scheduler.set_catalog(catalog());
        assert_eq!(scheduler.state(), PlaybackState::Done);
        assert_eq!(engine.spoken_texts().len(), 1);
    }

    #[test]
    fn test_cancel_drops_deferred_request() {
        let engine = RecordingEngine::new();
        let mut scheduler = SpeechScheduler::new(engine.clone(), VoicePreferences::default());

        scheduler.speak_answer("One.");
        scheduler.cancel();
        scheduler.set_catalog(catalog());
        assert_eq!(scheduler.state(), PlaybackState::Idle);
        assert!(engine.spoken_texts().is_empty());
    }

    // ---- Voice routing ----

    #[test]
    fn test_voices_follow_script_per_chunk() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.speak_answer("कर्म करो। Act without fear.");
        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        scheduler.handle_event(PlaybackEvent::ChunkFinished);

        let spoken = engine.spoken.lock().unwrap().clone();
        assert_eq!(spoken.len(), 2);
        assert_eq!(spoken[0].2.as_deref(), Some("Swara"));
        assert_eq!(spoken[1].2.as_deref(), Some("Priya"));
    }

    #[test]
    fn test_engine_default_voice_when_catalog_has_no_match() {
        let engine = RecordingEngine::new();
        let mut scheduler = SpeechScheduler::new(engine.clone(), VoicePreferences::default());
        scheduler.set_catalog(VoiceCatalog::new(vec![Voice::new(
            "French",
            "fr-FR",
            Some(Gender::Female),
        )]));

        scheduler.speak_answer("Plain text.");
        let spoken = engine.spoken.lock().unwrap().clone();
        assert_eq!(spoken[0].2, None);
    }

    // ---- Stale events ----

    #[test]
    fn test_events_in_idle_are_ignored() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine.clone());

        scheduler.handle_event(PlaybackEvent::ChunkFinished);
        scheduler.handle_event(PlaybackEvent::ChunkErrored("late".to_string()));
        assert_eq!(scheduler.state(), PlaybackState::Idle);
        assert!(engine.spoken_texts().is_empty());
    }

    #[test]
    fn test_is_active() {
        let engine = RecordingEngine::new();
        let mut scheduler = ready_scheduler(engine);

        assert!(!scheduler.is_active());
        scheduler.speak_answer("One. Two.");
        assert!(scheduler.is_active());
        scheduler.cancel();
        assert!(!scheduler.is_active());
    }
}

//! Dialogue orchestrator: central coordinator wiring retrieval, context,
//! prompt assembly, and generation.
//!
//! Invoked once per question. Stateless between questions; all state lives in
//! the injected index and conversation store. Per-request failures never
//! escape: anything past input validation converts into the fixed fallback
//! answer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, warn};

use gita_core::config::GitaConfig;
use gita_core::types::{ConversationTurn, Role};
use gita_corpus::embedding::DynEmbeddingService;
use gita_corpus::index::{SearchHit, VerseIndex};

use crate::citation::{select_cited, CitationPolicy};
use crate::error::DialogueError;
use crate::generation::DynGenerationService;
use crate::greeting::{GreetingDetector, GREETING_REPLY};
use crate::prompt::PromptBuilder;
use crate::store::ConversationStore;
use crate::types::{Answer, ConversationWindow};

/// Maximum question length in characters.
const MAX_QUESTION_LENGTH: usize = 2000;

/// Minimum question length in characters (greetings are exempt).
const MIN_QUESTION_LENGTH: usize = 3;

/// Fixed apology returned when generation fails or times out.
const FALLBACK_ANSWER: &str = "क्षमा करें, मैं अभी उत्तर देने में असमर्थ हूँ। कृपया पुनः प्रयास करें।";

/// Central coordinator for answering one question.
pub struct DialogueOrchestrator {
    index: Arc<VerseIndex>,
    store: Arc<dyn ConversationStore>,
    embedder: Box<dyn DynEmbeddingService>,
    generator: Box<dyn DynGenerationService>,
    greeting: GreetingDetector,
    prompt: PromptBuilder,
    top_k: usize,
    max_turns: usize,
    max_chars: usize,
    generation_timeout: Duration,
    citation_policy: CitationPolicy,
}

impl DialogueOrchestrator {
    /// Create an orchestrator over a shared verse index and store.
    pub fn new(
        index: Arc<VerseIndex>,
        store: Arc<dyn ConversationStore>,
        embedder: Box<dyn DynEmbeddingService>,
        generator: Box<dyn DynGenerationService>,
        config: &GitaConfig,
    ) -> Self {
        let citation_policy = CitationPolicy::parse(&config.generation.citation_policy)
            .unwrap_or_else(|| {
                warn!(
                    "Unknown citation policy '{}', using overlap",
                    config.generation.citation_policy
                );
                CitationPolicy::OverlapFiltered
            });

        Self {
            index,
            store,
            embedder,
            generator,
            greeting: GreetingDetector::new(),
            prompt: PromptBuilder::new(config.generation.max_prompt_chars),
            top_k: config.retrieval.top_k,
            max_turns: config.conversation.max_turns,
            max_chars: config.conversation.max_chars,
            generation_timeout: Duration::from_secs(config.generation.timeout_secs),
            citation_policy,
        }
    }

    /// Answer one question for one user.
    ///
    /// Returns `Err` only for invalid input. Every failure past validation
    /// (embedding, retrieval, generation, timeout) yields the fixed fallback
    /// answer instead, with nothing appended to history.
    pub async fn ask(&self, user_key: &str, question: &str) -> Result<Answer, DialogueError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DialogueError::EmptyQuestion);
        }

        // Greetings bypass retrieval and generation entirely, and are exempt
        // from the minimum length ("om" is two characters).
        if self.greeting.is_greeting(question) {
            let answer = Answer {
                text: GREETING_REPLY.to_string(),
                cited_verse_ids: vec![],
                generation_latency_ms: 0,
                llm_used: false,
            };
            self.record_exchange(user_key, question, &answer);
            return Ok(answer);
        }

        let length = question.chars().count();
        if length < MIN_QUESTION_LENGTH {
            return Err(DialogueError::QuestionTooShort(MIN_QUESTION_LENGTH));
        }
        if length > MAX_QUESTION_LENGTH {
            return Err(DialogueError::QuestionTooLong(MAX_QUESTION_LENGTH));
        }

        match self.answer_question(user_key, question).await {
            Ok(answer) => Ok(answer),
            Err(e) => {
                error!("Question handling failed, returning fallback: {}", e);
                Ok(Answer {
                    text: FALLBACK_ANSWER.to_string(),
                    cited_verse_ids: vec![],
                    generation_latency_ms: 0,
                    llm_used: false,
                })
            }
        }
    }

    /// Clear the user's conversation history. Idempotent.
    pub fn clear_history(&self, user_key: &str) -> Result<(), DialogueError> {
        self.store.clear(user_key)
    }

    /// The fallible retrieval-and-generation pipeline behind [`ask`].
    ///
    /// [`ask`]: DialogueOrchestrator::ask
    async fn answer_question(
        &self,
        user_key: &str,
        question: &str,
    ) -> Result<Answer, DialogueError> {
        let embedding = self.embedder.embed_boxed(question).await?;
        let hits: Vec<SearchHit> = self.index.search(&embedding, self.top_k)?;

        // A context read failure costs the window, never the answer.
        let window = match self
            .store
            .recent_window(user_key, self.max_turns, self.max_chars)
        {
            Ok(window) => window,
            Err(e) => {
                warn!("Context window read failed, proceeding without: {}", e);
                ConversationWindow::default()
            }
        };

        let request = self.prompt.build(question, &hits, &window);

        // The single suspension point, bounded by the configured timeout.
        let started = Instant::now();
        let text = match tokio::time::timeout(
            self.generation_timeout,
            self.generator.complete_boxed(&request),
        )
        .await
        {
            Err(_) => {
                return Err(DialogueError::GenerationTimeout(
                    self.generation_timeout.as_secs(),
                ))
            }
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok(text)) => text,
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        let cited_verse_ids = select_cited(self.citation_policy, &text, &hits);

        let answer = Answer {
            text,
            cited_verse_ids,
            generation_latency_ms: latency_ms,
            llm_used: true,
        };
        self.record_exchange(user_key, question, &answer);
        Ok(answer)
    }

    /// Append the question and answer turns.
    ///
    /// A history write failure is logged and swallowed: answer delivery must
    /// not depend on persistence.
    fn record_exchange(&self, user_key: &str, question: &str, answer: &Answer) {
        let user_turn = ConversationTurn::new(
            Some(user_key.to_string()),
            Role::User,
            question,
            vec![],
        );
        let assistant_turn = ConversationTurn::new(
            Some(user_key.to_string()),
            Role::Assistant,
            answer.text.clone(),
            answer.cited_verse_ids.clone(),
        );

        if let Err(e) = self.store.append(user_key, user_turn) {
            warn!("Failed to persist question turn: {}", e);
            return;
        }
        if let Err(e) = self.store.append(user_key, assistant_turn) {
            warn!("Failed to persist answer turn: {}", e);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

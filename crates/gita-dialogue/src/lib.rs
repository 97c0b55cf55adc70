//! Retrieval-augmented dialogue engine.
//!
//! Provides conversation history stores, prompt assembly, citation
//! selection, greeting detection, the generation capability trait, and the
//! orchestrator that turns one question into one grounded answer.

pub mod citation;
pub mod error;
pub mod generation;
pub mod greeting;
pub mod orchestrator;
pub mod prompt;
pub mod store;
pub mod types;

pub use citation::{select_cited, CitationPolicy};
pub use error::DialogueError;
pub use generation::{
    DynGenerationService, GenerationRequest, GenerationService, MockGeneration,
};
pub use greeting::{GreetingDetector, GREETING_REPLY};
pub use orchestrator::DialogueOrchestrator;
pub use prompt::PromptBuilder;
pub use store::{ConversationStore, MemoryConversationStore, SqliteConversationStore};
pub use types::{Answer, ConversationWindow};

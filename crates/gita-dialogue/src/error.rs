//! Error types for the dialogue engine.

use gita_core::error::GitaError;

/// Errors from the dialogue orchestration path.
///
/// Only the input-validation variants ever reach a caller of
/// [`DialogueOrchestrator::ask`](crate::orchestrator::DialogueOrchestrator::ask);
/// every other variant is caught at the orchestrator boundary and converted
/// into the fallback answer.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("question cannot be empty")]
    EmptyQuestion,
    #[error("question is shorter than {0} characters")]
    QuestionTooShort(usize),
    #[error("question exceeds maximum length of {0} characters")]
    QuestionTooLong(usize),
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("retrieval error: {0}")]
    Retrieval(String),
    #[error("generation timed out after {0}s")]
    GenerationTimeout(u64),
    #[error("generation error: {0}")]
    Generation(String),
    #[error("history error: {0}")]
    History(String),
}

impl From<GitaError> for DialogueError {
    fn from(err: GitaError) -> Self {
        match err {
            GitaError::Embedding(msg) => DialogueError::Embedding(msg),
            GitaError::Search(msg) | GitaError::Corpus(msg) => DialogueError::Retrieval(msg),
            GitaError::DimensionMismatch { .. } => DialogueError::Retrieval(err.to_string()),
            GitaError::Storage(msg) => DialogueError::History(msg),
            GitaError::Generation(msg) => DialogueError::Generation(msg),
            other => DialogueError::Generation(other.to_string()),
        }
    }
}

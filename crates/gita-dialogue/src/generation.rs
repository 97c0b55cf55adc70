//! Generation capability trait and a fixed-reply test implementation.
//!
//! Hosting the model (local or remote) belongs to the embedding application;
//! the engine only depends on this trait. The orchestrator bounds every
//! `complete` call with a timeout.

use gita_core::error::GitaError;

/// An assembled completion request: persona instruction plus the ordered
/// grounding-and-history block ending with the question.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    /// System/persona instruction.
    pub system: String,
    /// User content: retrieved verses, prior turns, and the question.
    pub user: String,
}

impl GenerationRequest {
    /// Total characters across both parts, as counted against the prompt
    /// budget.
    pub fn char_len(&self) -> usize {
        self.system.chars().count() + self.user.chars().count()
    }
}

/// Service for generating a grounded completion.
pub trait GenerationService: Send + Sync {
    /// Produce the completion text for the request.
    fn complete(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<String, GitaError>> + Send;
}

/// Object-safe version of [`GenerationService`] for dynamic dispatch.
///
/// A blanket implementation is provided so that every `GenerationService`
/// automatically implements `DynGenerationService`.
pub trait DynGenerationService: Send + Sync {
    /// Produce the completion text for the request (boxed future).
    fn complete_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<String, GitaError>> + Send + 'a>>;
}

/// Blanket impl: any `GenerationService` automatically implements `DynGenerationService`.
impl<T: GenerationService> DynGenerationService for T {
    fn complete_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<String, GitaError>> + Send + 'a>>
    {
        Box::pin(self.complete(request))
    }
}

/// Mock generation service returning a fixed reply.
///
/// Allows testing the orchestrator pipeline without a model.
#[derive(Debug, Clone)]
pub struct MockGeneration {
    reply: String,
}

impl MockGeneration {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl GenerationService for MockGeneration {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, GitaError> {
        if request.user.is_empty() {
            return Err(GitaError::Generation(
                "Cannot complete an empty request".to_string(),
            ));
        }
        Ok(self.reply.clone())
    }
}

/*!
 * Language model clients that return structured flashcards.
 *
 * The pipeline only talks to the [`FlashcardModel`] trait. Implementations are
 * responsible for requesting output that matches the flashcard schema and for
 * decoding the response into a validated [`FlashcardSet`].
 */

use async_trait::async_trait;

use crate::pipeline::FlashcardSet;

pub mod openai;

/// Failure signals a model client can raise
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// The API rejected the credentials
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The requested model does not exist or is not accessible
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Anything else, passed through unchanged
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A model that can turn a rendered prompt into a flashcard set
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlashcardModel: Send + Sync {
    /// Identifier of the model requests are sent to
    fn model_name(&self) -> String;

    /// Send the prompt and decode the structured response
    async fn invoke_structured(&self, prompt: &str) -> Result<FlashcardSet, ModelError>;
}

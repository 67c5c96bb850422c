//! Language Transfer Flashcards - turn YouTube lessons into vocabulary flashcards
//!
//! This library downloads the transcript of a YouTube video, asks an OpenAI model to
//! extract (source, translation) pairs from it, and writes them to a CSV file that
//! can be imported into any flashcard application.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::{ResolvedConfig, Settings, TargetLanguage};
pub use extractors::{TranscriptSource, VideoTranscript};
pub use llm::{FlashcardModel, ModelError};
pub use output::ExclusionSet;
pub use pipeline::{Flashcard, FlashcardPipeline, FlashcardSet};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Classified failures that end an invocation with a user-facing message
#[derive(thiserror::Error, Debug)]
pub enum FlashcardError {
    #[error("{setting} is required when it is not set in the .env file.\n\n{remediation}")]
    MissingConfiguration {
        setting: &'static str,
        remediation: String,
    },

    #[error("Invalid {setting} '{value}'. {hint}")]
    InvalidConfiguration {
        setting: &'static str,
        value: String,
        hint: String,
    },

    #[error("Please provide a valid YouTube URL in the form of \"https://www.youtube.com/watch?v=VIDEO_ID\" (got \"{0}\")")]
    InvalidLocator(String),

    #[error("Video does not have a transcript. Please try another video.")]
    NoTranscriptAvailable,

    #[error("Incorrect API key provided! Set a valid OPENAI_API_KEY in the .env file (run 'ltf env-location') or pass it with --api-key.")]
    AuthenticationFailure,

    #[error("The model '{0}' does not exist or you do not have access to it. Try one of: {known}", known = crate::config::KNOWN_MODELS.join(", "))]
    ModelNotFound(String),
}

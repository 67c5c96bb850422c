use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{ResolvedConfig, TargetLanguage};
use crate::extractors::{TranscriptSource, VideoTranscript};
use crate::llm::{FlashcardModel, ModelError};
use crate::output;
use crate::FlashcardError;

pub mod prompt;

pub use prompt::PromptTemplate;

/// A single (source, translation) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    /// English word, phrase or sentence
    pub source_text: String,

    /// Translation in the target language
    pub target_text: String,
}

impl Flashcard {
    pub fn new(source_text: impl Into<String>, target_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            target_text: target_text.into(),
        }
    }
}

/// Flashcards in the order the model returned them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardSet {
    pub flashcards: Vec<Flashcard>,
}

impl FlashcardSet {
    pub fn new(flashcards: Vec<Flashcard>) -> Self {
        Self { flashcards }
    }

    pub fn len(&self) -> usize {
        self.flashcards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flashcards.is_empty()
    }

    /// Check that every flashcard has both sides filled in
    pub fn validate(&self) -> Result<()> {
        for (index, card) in self.flashcards.iter().enumerate() {
            if card.source_text.trim().is_empty() || card.target_text.trim().is_empty() {
                anyhow::bail!(
                    "Flashcard #{} is incomplete (source: {:?}, target: {:?})",
                    index + 1,
                    card.source_text,
                    card.target_text
                );
            }
        }
        Ok(())
    }

    /// Strict JSON schema the model reply has to follow
    pub fn json_schema() -> Value {
        json!({
            "type": "object",
            "description": "A collection of vocabulary flashcards for a specific language pair.",
            "properties": {
                "flashcards": {
                    "type": "array",
                    "description": "A list of flashcards containing vocabulary pairs.",
                    "items": {
                        "type": "object",
                        "description": "A single vocabulary flashcard with translations between English and the target language.",
                        "properties": {
                            "source_text": {
                                "type": "string",
                                "description": "The English word, phrase, or sentence to be learned."
                            },
                            "target_text": {
                                "type": "string",
                                "description": "The translation of the English text in the target language."
                            }
                        },
                        "required": ["source_text", "target_text"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["flashcards"],
            "additionalProperties": false
        })
    }
}

/// Options for writing the CSV file
#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Directory of earlier CSV exports whose entries are skipped
    pub exclude: Option<PathBuf>,
    pub output_dir: PathBuf,
}

/// Main flashcard pipeline
pub struct FlashcardPipeline {
    source: Box<dyn TranscriptSource>,
    template: PromptTemplate,
    show_progress: bool,
}

impl FlashcardPipeline {
    /// Create a pipeline around a transcript source using the built-in prompt
    pub fn new(source: Box<dyn TranscriptSource>) -> Result<Self> {
        Ok(Self {
            source,
            template: PromptTemplate::builtin()?,
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Render the prompt without calling a model
    pub fn render_only(&self, video: &VideoTranscript, target_language: TargetLanguage) -> String {
        self.template.render(&video.title, target_language, &video.transcript)
    }

    /// Ask the model for flashcards, classifying authentication and model errors
    pub async fn extract(
        &self,
        video: &VideoTranscript,
        target_language: TargetLanguage,
        model: &dyn FlashcardModel,
    ) -> Result<FlashcardSet> {
        let prompt = self.render_only(video, target_language);
        tracing::info!("Requesting {} flashcards from {}", target_language, model.model_name());

        match model.invoke_structured(&prompt).await {
            Ok(set) => {
                tracing::info!("Model returned {} flashcards", set.len());
                Ok(set)
            }
            Err(ModelError::Authentication(detail)) => {
                tracing::debug!("Authentication failed: {}", detail);
                Err(FlashcardError::AuthenticationFailure.into())
            }
            Err(ModelError::ModelNotFound(detail)) => {
                tracing::debug!("Model not found: {}", detail);
                Err(FlashcardError::ModelNotFound(model.model_name()).into())
            }
            Err(ModelError::Other(err)) => Err(err),
        }
    }

    /// Fetch a transcript, extract flashcards and write them as CSV
    ///
    /// Exclusions are read first, so a broken exclusion file fails before any
    /// network call.
    pub async fn create_flashcards(
        &self,
        locator: &str,
        config: &ResolvedConfig,
        model: &dyn FlashcardModel,
        options: &CsvOptions,
    ) -> Result<PathBuf> {
        let exclusions = match &options.exclude {
            Some(dir) => Some(output::load_exclusions(dir)?),
            None => None,
        };

        let video = self.fetch(locator).await?;

        let progress = self.spinner(format!("Creating flashcards with {}...", model.model_name()));
        let extracted = self.extract(&video, config.target_language, model).await;
        progress.finish_and_clear();
        let flashcards = extracted?;

        output::write_csv(
            &options.output_dir,
            &flashcards,
            &video.title,
            options.delimiter,
            exclusions.as_ref(),
        )
    }

    /// Fetch a transcript and save the rendered prompt as a text file
    pub async fn create_prompt(
        &self,
        locator: &str,
        target_language: TargetLanguage,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let video = self.fetch(locator).await?;
        let prompt = self.render_only(&video, target_language);
        output::write_text(output_dir, &prompt, &video.title)
    }

    async fn fetch(&self, locator: &str) -> Result<VideoTranscript> {
        tracing::info!("Fetching {} transcript for: {}", self.source.platform_name(), locator);

        let progress = self.spinner("Downloading transcript...".to_string());
        let fetched = self.source.fetch(locator).await;
        progress.finish_and_clear();
        fetched
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.set_message(message);
        progress.enable_steady_tick(Duration::from_millis(100));
        progress
    }
}

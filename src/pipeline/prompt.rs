use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::TargetLanguage;

const BUILTIN_TEMPLATE: &str = include_str!("../../data/prompt.yaml");

pub const VIDEO_TITLE_SLOT: &str = "{video_title}";
pub const TARGET_LANGUAGE_SLOT: &str = "{target_language}";
pub const TRANSCRIPT_SLOT: &str = "{youtube_transcript}";

#[derive(Debug, Deserialize)]
struct TemplateFile {
    template: String,
}

/// Prompt with three named slots: video title, target language and transcript
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// The template shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_TEMPLATE)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: TemplateFile = serde_yaml::from_str(yaml).context("Failed to parse prompt template")?;
        Self::new(file.template)
    }

    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for slot in [VIDEO_TITLE_SLOT, TARGET_LANGUAGE_SLOT, TRANSCRIPT_SLOT] {
            if !template.contains(slot) {
                anyhow::bail!("Prompt template is missing the {} slot", slot);
            }
        }
        Ok(Self { template })
    }

    /// Substitute the slots in a single pass
    ///
    /// Values are inserted verbatim and never rescanned, so a transcript that
    /// happens to contain `{target_language}` is left as written.
    pub fn render(&self, video_title: &str, target_language: TargetLanguage, youtube_transcript: &str) -> String {
        let slots = [
            (VIDEO_TITLE_SLOT, video_title),
            (TARGET_LANGUAGE_SLOT, target_language.as_str()),
            (TRANSCRIPT_SLOT, youtube_transcript),
        ];

        let mut rendered = String::with_capacity(self.template.len() + youtube_transcript.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            rendered.push_str(&rest[..start]);
            let tail = &rest[start..];

            match slots.iter().find(|(slot, _)| tail.starts_with(slot)) {
                Some((slot, value)) => {
                    rendered.push_str(value);
                    rest = &tail[slot.len()..];
                }
                None => {
                    rendered.push('{');
                    rest = &tail[1..];
                }
            }
        }

        rendered.push_str(rest);
        rendered
    }
}

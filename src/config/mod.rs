use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::FlashcardError;

/// Model used when neither the CLI nor the settings name one
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Models known to work with structured flashcard output
pub const KNOWN_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo"];

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_NAME_VAR: &str = "OPENAI_MODEL_NAME";
pub const TARGET_LANGUAGE_VAR: &str = "TARGET_LANGUAGE";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

const REMEDIATION: &str = "Recommended: Set the value in the .env file. For more information run 'ltf env-location'.\nOr set the value in the CLI";

/// Languages taught by Language Transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetLanguage {
    Arabic,
    French,
    German,
    Greek,
    Italian,
    Spanish,
    Swahili,
    Turkish,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 8] = [
        TargetLanguage::Arabic,
        TargetLanguage::French,
        TargetLanguage::German,
        TargetLanguage::Greek,
        TargetLanguage::Italian,
        TargetLanguage::Spanish,
        TargetLanguage::Swahili,
        TargetLanguage::Turkish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetLanguage::Arabic => "Arabic",
            TargetLanguage::French => "French",
            TargetLanguage::German => "German",
            TargetLanguage::Greek => "Greek",
            TargetLanguage::Italian => "Italian",
            TargetLanguage::Spanish => "Spanish",
            TargetLanguage::Swahili => "Swahili",
            TargetLanguage::Turkish => "Turkish",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetLanguage {
    type Err = FlashcardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FlashcardError::InvalidConfiguration {
                setting: "target language",
                value: s.to_string(),
                hint: format!(
                    "Supported languages: {}",
                    Self::ALL.map(|lang| lang.as_str()).join(", ")
                ),
            })
    }
}

/// Values read from the process environment and the `.env` file
///
/// Environment variables win over the file, matching how the settings were
/// always loaded. Blank values are treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub target_language: Option<String>,
    pub base_url: Option<String>,
}

impl Settings {
    /// Load settings from the environment and the given `.env` file
    pub fn load(env_file: &Path) -> Result<Self> {
        let from_file = if env_file.exists() {
            Self::from_env_file(env_file)?
        } else {
            tracing::debug!("No settings file at {}", env_file.display());
            Self::default()
        };

        Ok(Self::from_process_env().or(from_file))
    }

    /// Parse a `.env` file without touching the process environment
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let entries = read_env_entries(path)?;
        Ok(Self::from_pairs(entries))
    }

    pub fn from_process_env() -> Self {
        Self::from_pairs(
            [API_KEY_VAR, MODEL_NAME_VAR, TARGET_LANGUAGE_VAR, BASE_URL_VAR]
                .into_iter()
                .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value))),
        )
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings = Self::default();
        for (key, value) in pairs {
            let value = non_blank(value.into());
            match key.as_ref() {
                API_KEY_VAR => settings.api_key = value,
                MODEL_NAME_VAR => settings.model_name = value,
                TARGET_LANGUAGE_VAR => settings.target_language = value,
                BASE_URL_VAR => settings.base_url = value,
                _ => {}
            }
        }
        settings
    }

    /// Field-wise fallback: keep our value, fill gaps from `other`
    pub fn or(self, other: Settings) -> Settings {
        Settings {
            api_key: self.api_key.or(other.api_key),
            model_name: self.model_name.or(other.model_name),
            target_language: self.target_language.or(other.target_language),
            base_url: self.base_url.or(other.base_url),
        }
    }
}

/// Values supplied on the command line for a single invocation
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub target_language: Option<String>,
}

/// Final configuration for one `csv` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub api_key: String,
    pub model_name: String,
    pub target_language: TargetLanguage,
    pub base_url: Option<String>,
}

impl ResolvedConfig {
    pub fn resolve(cli: CliOverrides, settings: &Settings) -> std::result::Result<Self, FlashcardError> {
        // Validate the language first so a typo is reported even without a key
        let target_language =
            resolve_target_language(cli.target_language.as_deref(), settings.target_language.as_deref())?;
        let api_key = resolve_api_key(cli.api_key, settings.api_key.clone())?;
        let model_name = resolve_model_name(cli.model_name, settings.model_name.clone());

        Ok(Self {
            api_key,
            model_name,
            target_language,
            base_url: settings.base_url.clone(),
        })
    }
}

/// CLI value beats persisted value
pub fn resolve<T>(cli: Option<T>, persisted: Option<T>) -> Option<T> {
    cli.or(persisted)
}

pub fn resolve_api_key(
    cli: Option<String>,
    persisted: Option<String>,
) -> std::result::Result<String, FlashcardError> {
    resolve(cli.and_then(non_blank), persisted.and_then(non_blank)).ok_or_else(|| {
        FlashcardError::MissingConfiguration {
            setting: "OpenAI API key",
            remediation: REMEDIATION.to_string(),
        }
    })
}

pub fn resolve_model_name(cli: Option<String>, persisted: Option<String>) -> String {
    resolve(cli.and_then(non_blank), persisted.and_then(non_blank))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

pub fn resolve_target_language(
    cli: Option<&str>,
    persisted: Option<&str>,
) -> std::result::Result<TargetLanguage, FlashcardError> {
    let value = resolve(
        cli.filter(|v| !v.trim().is_empty()),
        persisted.filter(|v| !v.trim().is_empty()),
    )
    .ok_or_else(|| FlashcardError::MissingConfiguration {
        setting: "Target language",
        remediation: REMEDIATION.to_string(),
    })?;

    value.parse()
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Directory holding the settings file
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".ltf"))
}

/// Default location of the `.env` settings file
pub fn default_env_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(".env"))
}

/// Help text for `ltf env-location`
pub fn env_information(env_file: &Path) -> String {
    format!(
        "Language-Transfer Flashcards (ltf) is looking for the .env file at the following location:\n\
         --> {} <--\n\n\
         If the file does not exist, please create it and set the following variables:\n\
         \"{API_KEY_VAR}\", \"{MODEL_NAME_VAR}\" and \"{TARGET_LANGUAGE_VAR}\".\n\n\
         Example:\n\
         {API_KEY_VAR}=sk-...\n\
         {MODEL_NAME_VAR}={DEFAULT_MODEL}\n\
         {TARGET_LANGUAGE_VAR}=Swahili",
        env_file.display()
    )
}

/// Entries of a `.env` file, in file order
pub fn read_env_entries(path: &Path) -> Result<Vec<(String, String)>> {
    if !path.exists() {
        anyhow::bail!(
            "No .env file found at {}. Run 'ltf env-location' for setup instructions.",
            path.display()
        );
    }

    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open settings file {}", path.display()))?;

    iter.map(|entry| entry.with_context(|| format!("Failed to parse settings file {}", path.display())))
        .collect()
}

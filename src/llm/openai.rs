use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::{FlashcardModel, ModelError};
use crate::pipeline::FlashcardSet;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Structured extraction of a full lesson can take minutes
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// OpenAI chat completions client with structured output
pub struct OpenAi {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL, e.g. `https://api.openai.com/v1`
    base_url: String,
    /// Model every request is sent to
    model: String,
}

/// Chat completions request
#[derive(Debug, Serialize)]
pub struct OpenAiRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAiMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Structured output constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAiMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    #[serde(default)]
    message: String,
    code: Option<String>,
}

impl OpenAiRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            response_format: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAiMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Require the reply to match a strict JSON schema
    pub fn json_schema(mut self, name: &str, schema: Value) -> Self {
        self.response_format = Some(json!({
            "type": "json_schema",
            "json_schema": {
                "name": name,
                "strict": true,
                "schema": schema,
            }
        }));
        self
    }
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for OpenAI")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Build the flashcard request for a rendered prompt
    pub fn flashcard_request(&self, prompt: &str) -> OpenAiRequest {
        OpenAiRequest::new(&self.model)
            .temperature(0.0)
            .add_message("user", prompt)
            .json_schema("FlashcardSet", FlashcardSet::json_schema())
    }
}

/// Map a failed HTTP exchange onto the model error taxonomy
fn classify_failure(status: StatusCode, body: &str, model: &str) -> ModelError {
    let detail = serde_json::from_str::<OpenAiErrorBody>(body).ok().map(|b| b.error);
    let code = detail.as_ref().and_then(|d| d.code.as_deref());
    let message = detail
        .as_ref()
        .map(|d| d.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    match (status, code) {
        (StatusCode::UNAUTHORIZED, _) | (_, Some("invalid_api_key")) => ModelError::Authentication(message),
        (StatusCode::NOT_FOUND, _) | (_, Some("model_not_found")) => {
            ModelError::ModelNotFound(format!("{model}: {message}"))
        }
        _ => ModelError::Other(anyhow!("OpenAI API error ({}): {}", status, message)),
    }
}

/// Decode the assistant message into a validated flashcard set
fn decode_reply(response: OpenAiResponse) -> Result<FlashcardSet, ModelError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| anyhow!("OpenAI response contained no choices"))?;

    if let Some(refusal) = message.refusal {
        return Err(anyhow!("The model refused to create flashcards: {}", refusal).into());
    }

    let content = message
        .content
        .ok_or_else(|| anyhow!("OpenAI response contained no content"))?;

    let set: FlashcardSet =
        serde_json::from_str(&content).context("Model reply does not match the flashcard schema")?;
    set.validate()?;
    Ok(set)
}

#[async_trait]
impl FlashcardModel for OpenAi {
    fn model_name(&self) -> String {
        self.model.clone()
    }

    async fn invoke_structured(&self, prompt: &str) -> Result<FlashcardSet, ModelError> {
        let request = self.flashcard_request(prompt);
        tracing::debug!("Sending {} prompt characters to {}", prompt.len(), self.model);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            tracing::debug!("OpenAI API error ({}): {}", status, body);
            return Err(classify_failure(status, &body, &self.model));
        }

        let parsed = response
            .json::<OpenAiResponse>()
            .await
            .context("Failed to parse OpenAI API response")?;

        decode_reply(parsed)
    }
}

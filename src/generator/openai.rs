use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{GenerateError, ResponseGenerator};
use crate::config::Preferences;
use crate::message::Message;

pub const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const MAX_TOKENS: u32 = 256;
/// Number of prior messages forwarded with each request
pub const CONTEXT_WINDOW: usize = 5;

pub const MISSING_KEY_ADVISORY: &str =
    "OpenAI API key is not configured. Set OPENAI_API_KEY and restart to get real responses.";
pub const NO_RESPONSE: &str = "Sorry, I didn't get a response from the model.";

const NOT_SPECIFIED: &str = "N/A";

#[derive(Serialize, Debug, Clone, PartialEq)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Clone)]
pub struct OpenAIGenerator {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    preferences: Preferences,
}

impl OpenAIGenerator {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: COMPLETIONS_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            preferences: Preferences::default(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    fn build_request(&self, history: &[Message], utterance: &str) -> OpenAIRequest {
        let start = history.len().saturating_sub(CONTEXT_WINDOW);

        let mut messages = Vec::with_capacity(CONTEXT_WINDOW + 2);
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: system_instruction(&self.preferences),
        });
        messages.extend(history[start..].iter().map(|msg| OpenAIMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }));
        messages.push(OpenAIMessage {
            role: "user".to_string(),
            content: utterance.to_string(),
        });

        OpenAIRequest {
            model: self.model.clone(),
            messages,
            max_tokens: MAX_TOKENS,
        }
    }
}

fn or_not_specified(field: &Option<String>) -> &str {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NOT_SPECIFIED)
}

/// System prompt carrying the user's reply preferences
pub fn system_instruction(preferences: &Preferences) -> String {
    format!(
        "You are a helpful assistant. Follow these user preferences when replying.\n\
         Tone: {}\n\
         Length: {}\n\
         Examples: {}\n\
         Language: {}",
        or_not_specified(&preferences.tone),
        or_not_specified(&preferences.length),
        or_not_specified(&preferences.examples),
        or_not_specified(&preferences.language),
    )
}

#[async_trait]
impl ResponseGenerator for OpenAIGenerator {
    async fn generate(&self, history: &[Message], utterance: &str) -> Result<String, GenerateError> {
        let Some(api_key) = &self.api_key else {
            warn!("no API key configured, skipping completion request");
            return Ok(MISSING_KEY_ADVISORY.to_string());
        };

        let request = self.build_request(history, utterance);
        debug!(model = %self.model, messages = request.messages.len(), "sending completion request");

        let response = self.client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Status { status, body });
        }

        let openai_response: OpenAIResponse = response.json().await?;
        Ok(openai_response.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_else(|| NO_RESPONSE.to_string()))
    }

    fn label(&self) -> String {
        format!("OpenAI: {}", self.model)
    }

    fn context_window(&self) -> Option<usize> {
        Some(CONTEXT_WINDOW)
    }
}

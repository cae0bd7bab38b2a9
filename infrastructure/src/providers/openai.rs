//! OpenAI-compatible chat-completions backend
//!
//! Renders the persona prompt and the transcript as a chat-completions
//! request: the persona prompt leads as a `system` message, then each entry
//! in order (System → `system`, External → `user` prefixed with `User: `,
//! Responder → `assistant`).

use async_trait::async_trait;
use reqwest::StatusCode;
use roundtable_application::{BackendError, ResponderBackend};
use roundtable_domain::{Entry, Origin, PromptTemplate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised while setting up a backend
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("No API key: set providers.openai.api_key or ${0}")]
    MissingApiKey(String),

    #[error("Invalid backend configuration: {0}")]
    Config(String),

    #[error("Could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Everything needed to talk to one chat-completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub struct OpenAiBackend {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiBackend {
    pub fn new(settings: OpenAiSettings) -> Result<Self, OpenAiError> {
        if settings.model.trim().is_empty() {
            return Err(OpenAiError::Config("backend.model is empty".to_string()));
        }
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn request<'a>(&'a self, persona_prompt: &'a str, transcript: &'a [Entry]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.settings.model,
            messages: render_messages(persona_prompt, transcript),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

/// Map a persona prompt plus transcript onto chat messages
pub fn render_messages(persona_prompt: &str, transcript: &[Entry]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(ChatMessage::new("system", persona_prompt));
    for entry in transcript {
        let message = match &entry.origin {
            Origin::System => ChatMessage::new("system", entry.content.clone()),
            Origin::External => {
                ChatMessage::new("user", PromptTemplate::external_message(&entry.content))
            }
            Origin::Responder(_) => ChatMessage::new("assistant", entry.content.clone()),
        };
        messages.push(message);
    }
    messages
}

#[async_trait]
impl ResponderBackend for OpenAiBackend {
    async fn generate(
        &self,
        persona_prompt: &str,
        transcript: &[Entry],
    ) -> Result<String, BackendError> {
        let request = self.request(persona_prompt, transcript);
        debug!(
            model = %self.settings.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, body));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        completion.into_text()
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn map_http_error(status: StatusCode, body: String) -> BackendError {
    let message = format!("HTTP {}: {}", status.as_u16(), body.trim());
    if status == StatusCode::TOO_MANY_REQUESTS {
        BackendError::QuotaExceeded(message)
    } else {
        BackendError::RequestFailed(message)
    }
}

// ============================================================================
// Chat Completions API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &'static str, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, BackendError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BackendError::InvalidResponse("no message content".to_string()))
    }
}

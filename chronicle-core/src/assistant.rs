//! Historical assistant - free-form questions answered by a chat model
//!
//! Provides an `AssistantBackend` trait with one implementation:
//! - **ChatCompletions** - any OpenAI-compatible `/chat/completions` endpoint
//!
//! Each question is a single best-effort call: no retry, no caching, no
//! timeout beyond the HTTP client default. Failures come back as a typed
//! [`AssistantError`]; [`AssistantReply`] turns either outcome into text a
//! user can read.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AssistantConfig;

/// Model used by the original dashboard.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// ============================================================================
// AssistantBackend trait
// ============================================================================

/// Abstraction over question-answering providers.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Pass the question through unmodified and return the answer text.
    async fn ask(&self, question: &str) -> Result<String, AssistantError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Response contained no answer")]
    EmptyAnswer,

    #[error("Missing API key")]
    MissingApiKey,
}

// ============================================================================
// Config
// ============================================================================

/// Chat completions client configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl ChatConfig {
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> Self {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .unwrap_or_default();

        Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl From<&AssistantConfig> for ChatConfig {
    fn from(cfg: &AssistantConfig) -> Self {
        Self::new(cfg.api_key.clone(), cfg.model.clone(), cfg.base_url.clone())
    }
}

// ============================================================================
// Chat completions API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: Option<ChatErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ChatErrorDetail {
    message: String,
}

// ============================================================================
// ChatCompletionsClient
// ============================================================================

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    config: ChatConfig,
}

impl ChatCompletionsClient {
    pub fn new(config: ChatConfig) -> Result<Self, AssistantError> {
        if config.api_key.is_empty() {
            return Err(AssistantError::MissingApiKey);
        }

        let client = Client::builder().build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, question: &str) -> Result<String, AssistantError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: question,
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ChatErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .unwrap_or(error_body);

            tracing::error!(code = status.as_u16(), message = %message, "Chat completions API error");

            return Err(AssistantError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AssistantError::EmptyAnswer)
    }
}

#[async_trait]
impl AssistantBackend for ChatCompletionsClient {
    async fn ask(&self, question: &str) -> Result<String, AssistantError> {
        if question.trim().is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }
        self.complete(question).await
    }

    fn name(&self) -> &str {
        "chat-completions"
    }
}

// ============================================================================
// Display conversion
// ============================================================================

/// Outcome of an assistant question, ready to show to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub ok: bool,
    pub message: String,
}

impl AssistantReply {
    pub fn from_result(result: Result<String, AssistantError>) -> Self {
        match result {
            Ok(answer) => Self {
                ok: true,
                message: answer,
            },
            Err(AssistantError::EmptyQuestion) => Self {
                ok: false,
                message: "Please enter a question.".to_string(),
            },
            Err(e) => Self {
                ok: false,
                message: format!("Error querying the assistant: {}", e),
            },
        }
    }
}

/// Ask a backend and convert the outcome for display. Never fails.
pub async fn ask_for_display(backend: &dyn AssistantBackend, question: &str) -> AssistantReply {
    let result = backend.ask(question).await;
    if let Err(e) = &result {
        tracing::warn!(backend = backend.name(), error = %e, "Assistant question failed");
    }
    AssistantReply::from_result(result)
}

// ============================================================================
// TESTS
// ============================================================================

/// LLM Client — the single point of entry for all completion-endpoint calls.
///
/// ARCHITECTURAL RULE: No other module may talk to the completion endpoint directly.
/// Pipelines depend on the `CompletionTransport` trait so tests can inject a fake endpoint.
///
/// Models and temperatures are hardcoded per pipeline (see `crate::generation::prompts`).
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

/// Upper bound on a single remote call, applied on both the generation and scoring paths.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

const HTTP_REFERER: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request timed out after {}s", CALL_TIMEOUT.as_secs())]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    MissingContent,
}

/// Endpoint settings handed to every client. Pipelines never read the environment.
#[derive(Clone)]
pub struct LlmSettings {
    pub api_url: String,
    pub api_key: String,
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: &'static str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    /// Sent as the `X-Title` header, not part of the JSON body.
    #[serde(skip)]
    pub app_title: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatRequest {
    /// Builds a single-turn user request.
    pub fn user(
        model: &'static str,
        temperature: f32,
        app_title: &'static str,
        prompt: String,
    ) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            app_title,
        }
    }

    pub fn prompt(&self) -> &str {
        self.messages
            .first()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The top completion choice returned by the endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResult {
    pub raw_text: String,
}

/// Anything that can turn a chat request into a completion.
///
/// Carried by pipelines as `Arc<dyn CompletionTransport>`.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<CompletionResult, LlmError>;
}

/// HTTP transport for an OpenAI-compatible chat completions endpoint.
///
/// A fresh `reqwest::Client` is built for every call so no connection state
/// outlives the attempt that needed it.
#[derive(Debug, Clone)]
pub struct LlmClient {
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl CompletionTransport for LlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<CompletionResult, LlmError> {
        let client = Client::builder().timeout(CALL_TIMEOUT).build()?;

        let response = client
            .post(&self.settings.api_url)
            .bearer_auth(&self.settings.api_key)
            .header("HTTP-Referer", HTTP_REFERER)
            .header("X-Title", request.app_title)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let result = parse_completion(&body)?;
        debug!(
            "Completion received from {}: {} chars",
            request.model,
            result.raw_text.len()
        );
        Ok(result)
    }
}

fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Http(e)
    }
}

/// Parses `{choices: [{message: {content}}]}` and returns the first choice's content.
///
/// A body without that structure is a `Parse` error; an empty choice list or
/// a null/blank content field is `MissingContent`.
pub fn parse_completion(body: &str) -> Result<CompletionResult, LlmError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    let raw_text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(LlmError::MissingContent)?;
    Ok(CompletionResult { raw_text })
}

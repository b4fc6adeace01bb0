use async_trait::async_trait;
use openai::chat::{ChatCompletionMessage, ChatCompletionMessageRole};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::Settings;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatCompletionMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum PromptError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(serde_json::Error),
    #[error("http error: {0}")]
    Http(u16),
    #[error("completion contained no message content")]
    EmptyResponse,
}

fn msg(role: ChatCompletionMessageRole, txt: &str) -> ChatCompletionMessage {
    ChatCompletionMessage {
        role,
        content: Some(txt.to_string()),
        ..Default::default()
    }
}

/// Anything able to turn a prompt into the model's answer text.
///
/// Handlers only see this trait so tests can swap the provider for a stub.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, PromptError>;
}

/// Client for an OpenAI compatible chat completions endpoint (Groq by default).
#[derive(Clone, Debug)]
pub struct ChatClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(
        api_base: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, PromptError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PromptError::Network(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, PromptError> {
        Self::new(
            &settings.groq_api_base,
            &settings.groq_api_key,
            &settings.completion_model,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send chat messages and return the first choice's content.
    ///
    /// Logs status and a prefix of the raw body; a non-success status is
    /// reported as [`PromptError::Http`].
    pub async fn call_chat(
        &self,
        messages: Vec<ChatCompletionMessage>,
    ) -> Result<String, PromptError> {
        let req = ChatRequest {
            model: &self.model,
            messages: &messages,
        };

        debug!("\u{2192} completion request: model = {}", req.model);
        let res = self
            .http
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&req)
            .send()
            .await
            .map_err(|e| {
                error!("network error to completion endpoint: {e}");
                PromptError::Network(e.to_string())
            })?;

        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .map_err(|e| PromptError::Network(e.to_string()))?;
        debug!(
            %status,
            "\u{2190} body = {}",
            String::from_utf8_lossy(&bytes[..bytes.len().min(1024)])
        );

        if !status.is_success() {
            error!(%status, "completion endpoint rejected the request");
            return Err(PromptError::Http(status.as_u16()));
        }

        let chat: ChatResponse = serde_json::from_slice(&bytes).map_err(PromptError::Parse)?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(PromptError::EmptyResponse)
    }
}

#[async_trait]
impl CompletionBackend for ChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, PromptError> {
        self.call_chat(vec![msg(ChatCompletionMessageRole::User, prompt)])
            .await
    }
}

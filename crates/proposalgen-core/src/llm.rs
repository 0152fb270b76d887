//! Chat-completion client shared by every pipeline stage.
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol (OpenRouter and
//! most self-hosted gateways accept it). One model, one base URL, no streaming.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{SecretValue, Secrets};

/// The single model every agent talks to.
pub const MODEL_ID: &str = "mistralai/mistral-7b-instruct";

const MAX_ERROR_DETAIL: usize = 800;

/// Upper bound for a single model or search request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(2)
        .build()
        .context("failed to build HTTP client")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Anything that can turn a conversation into one assistant reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_id(&self) -> &str;

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiCompatibleClient {
    http: Client,
    api_key: SecretValue,
    base_url: String,
}

impl OpenAiCompatibleClient {
    pub fn new(base_url: &str, api_key: SecretValue) -> Result<Self> {
        Self::with_timeout(base_url, api_key, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, api_key: SecretValue, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_secrets(secrets: &Secrets) -> Result<Self> {
        Self::new(&secrets.model_endpoint, secrets.model_api_key.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleClient {
    fn model_id(&self) -> &str {
        MODEL_ID
    }

    #[instrument(name = "llm.complete", skip_all, fields(model = MODEL_ID, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = CompletionRequest {
            model: MODEL_ID,
            messages,
        };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let detail: String = body.chars().take(MAX_ERROR_DETAIL).collect();
            if detail.trim().is_empty() {
                return Err(anyhow!("model endpoint error: {status}"));
            }
            return Err(anyhow!("model endpoint error: {status}\n{detail}"));
        }

        let body: CompletionResponse = resp.json().await?;
        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("model endpoint returned no completion content"))?;

        debug!(chars = text.len(), "completion received");
        Ok(text)
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, instrument};

use paperqa_core::config::LlmConfig;
use paperqa_core::traits::ChatModel;

use crate::error::LlmError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

/// Settings for [`OpenAiChatClient`].
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub base_url: String,
    pub model: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl From<&LlmConfig> for ChatClientConfig {
    fn from(cfg: &LlmConfig) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            temperature: cfg.temperature,
            timeout_secs: cfg.timeout_secs,
        }
    }
}

/// Single-shot chat completion client. One request per prompt, no retry.
pub struct OpenAiChatClient {
    http_client: ReqwestClient,
    config: ChatClientConfig,
}

impl OpenAiChatClient {
    pub fn new(cfg: &LlmConfig) -> Result<Self> {
        Self::with_config(ChatClientConfig::from(cfg))
    }

    pub fn with_config(config: ChatClientConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http_client, config })
    }

    pub fn model(&self) -> &str { &self.config.model }

    /// Sends `prompt` as one user message and returns the first choice's content.
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_chars = prompt.len()))]
    pub async fn chat(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.config.temperature,
        };
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let mut builder = self.http_client.post(url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(LlmError::from_status(status, body));
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::EmptyCompletion(body))?;
        debug!(answer_chars = content.len(), "completion received");
        Ok(content)
    }
}

#[async_trait]
impl ChatModel for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(self.chat(prompt).await?)
    }
}

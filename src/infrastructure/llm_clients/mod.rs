pub mod gemini;
pub mod openai_compatible;

use std::time::Duration;

use crate::domain::error::Result;
use crate::domain::llm_config::{LLMConfig, LLMProvider};
use async_trait::async_trait;
use gemini::GeminiClient;
use openai_compatible::OpenAICompatibleClient;

/// One chat-completion round-trip: a system prompt plus one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    /// Ask the provider for a bare JSON object when it supports that mode.
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            json_mode: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub content: String,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

pub(crate) fn build_http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Dispatches on `LLMConfig::provider`: Gemini speaks `generateContent`,
/// everything else speaks OpenAI-style `/chat/completions`.
pub struct RouterClient {
    config: LLMConfig,
    openai: OpenAICompatibleClient,
    gemini: GeminiClient,
}

impl RouterClient {
    pub fn new(config: LLMConfig) -> Self {
        Self {
            openai: OpenAICompatibleClient::new(config.timeout_secs),
            gemini: GeminiClient::new(config.timeout_secs),
            config,
        }
    }
}

#[async_trait]
impl CompletionClient for RouterClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let content = match self.config.provider {
            LLMProvider::Gemini => self.gemini.generate(&self.config, &request).await?,
            _ => self.openai.generate(&self.config, &request).await?,
        };
        Ok(CompletionResponse { content })
    }
}

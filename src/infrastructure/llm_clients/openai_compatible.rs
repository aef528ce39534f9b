use super::{build_http_client, CompletionRequest};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::{LLMConfig, LLMProvider};
use serde_json::{json, Value};
use tracing::debug;

/// OpenAI, OpenRouter and local servers exposing `/chat/completions`.
pub struct OpenAICompatibleClient {
    client: reqwest::Client,
}

impl OpenAICompatibleClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: build_http_client(timeout_secs),
        }
    }

    /// Local servers run without auth; hosted providers require a key.
    fn api_key(config: &LLMConfig) -> Result<Option<String>> {
        match (&config.api_key, config.provider) {
            (Some(key), _) if !key.trim().is_empty() => Ok(Some(key.clone())),
            (_, LLMProvider::Local) => Ok(None),
            (_, provider) => Err(AppError::LLMError(format!(
                "Missing API key for {:?}",
                provider
            ))),
        }
    }

    fn endpoint(config: &LLMConfig) -> String {
        if config.base_url.ends_with('/') {
            format!("{}chat/completions", config.base_url)
        } else {
            format!("{}/chat/completions", config.base_url)
        }
    }

    fn request_body(config: &LLMConfig, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": config.model,
            "messages": [
                {
                    "role": "system",
                    "content": request.system
                },
                {
                    "role": "user",
                    "content": request.user
                }
            ],
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
        });
        if request.json_mode && config.provider != LLMProvider::Local {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }

    pub async fn generate(&self, config: &LLMConfig, request: &CompletionRequest) -> Result<String> {
        let api_key = Self::api_key(config)?;
        let url = Self::endpoint(config);
        let body = Self::request_body(config, request);
        debug!(model = %config.model, url = %url, "Sending chat completion request");

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMError(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::LLMError("Invalid response format".to_string()))
    }
}

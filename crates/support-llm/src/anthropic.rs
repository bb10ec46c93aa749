//! Anthropic messages API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use support_core::{CompletionModel, LlmConfig, Result, SupportError};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Completion client for the Anthropic messages API.
pub struct AnthropicModel {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

impl AnthropicModel {
    /// Create a client from the LLM configuration.
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                SupportError::completion("anthropic", format!("Failed to build client: {}", e))
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl CompletionModel for AnthropicModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);

        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{"role": "user", "content": prompt}],
        });

        let res = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| SupportError::completion("anthropic", e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            tracing::warn!("Anthropic completion request failed with {}", status);
            return Err(SupportError::completion(
                "anthropic",
                format!("Request failed ({}): {}", status, text),
            ));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| SupportError::completion("anthropic", e.to_string()))?;

        let content = payload["content"][0]["text"]
            .as_str()
            .ok_or_else(|| SupportError::completion("anthropic", "Malformed completion payload"))?
            .to_string();

        tracing::debug!("Completion of {} chars from model {}", content.len(), self.model);

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let config = LlmConfig::default();
        let model = AnthropicModel::new(&config, "key".to_string()).unwrap();
        assert_eq!(model.base_url, "https://api.anthropic.com");
    }
}

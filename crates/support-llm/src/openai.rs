//! OpenAI chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use support_core::{CompletionModel, LlmConfig, Result, SupportError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Completion client for the OpenAI chat completions API.
pub struct OpenAiModel {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

impl OpenAiModel {
    /// Create a client from the LLM configuration.
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SupportError::completion("openai", format!("Failed to build client: {}", e)))?;

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
impl CompletionModel for OpenAiModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SupportError::completion("openai", e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            tracing::warn!("OpenAI completion request failed with {}", status);
            return Err(SupportError::completion(
                "openai",
                format!("Request failed ({}): {}", status, text),
            ));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| SupportError::completion("openai", e.to_string()))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| SupportError::completion("openai", "Malformed completion payload"))?
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
        let model = OpenAiModel::new(&config, "key".to_string()).unwrap();
        assert_eq!(model.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_base_url_override() {
        let config = LlmConfig {
            base_url: Some("http://localhost:1234/".to_string()),
            ..LlmConfig::default()
        };
        let model = OpenAiModel::new(&config, "key".to_string()).unwrap();
        assert_eq!(model.base_url, "http://localhost:1234");
    }
}

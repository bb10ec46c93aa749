//! Google Gemini generateContent client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use support_core::{CompletionModel, LlmConfig, Result, SupportError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Completion client for the Gemini REST API.
pub struct GeminiModel {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

impl GeminiModel {
    /// Create a client from the LLM configuration.
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SupportError::completion("gemini", format!("Failed to build client: {}", e)))?;

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
impl CompletionModel for GeminiModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
        });

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SupportError::completion("gemini", e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            tracing::warn!("Gemini completion request failed with {}", status);
            return Err(SupportError::completion(
                "gemini",
                format!("Request failed ({}): {}", status, text),
            ));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| SupportError::completion("gemini", e.to_string()))?;

        let content = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| SupportError::completion("gemini", "Malformed completion payload"))?
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
        let model = GeminiModel::new(&config, "key".to_string()).unwrap();
        assert_eq!(model.base_url, "https://generativelanguage.googleapis.com");
    }
}

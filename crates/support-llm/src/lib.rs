//! support-llm - Completion providers
//!
//! One reqwest client per provider behind the [`CompletionModel`] trait.
//! The provider is picked once, from the enumerated `llm.provider` config
//! field, so the set is exhaustive-checkable and an unknown name is a
//! config-parse error rather than a runtime surprise.

mod anthropic;
mod gemini;
mod mock;
mod openai;

pub use anthropic::AnthropicModel;
pub use gemini::GeminiModel;
pub use mock::{FailingCompletion, StaticCompletion};
pub use openai::OpenAiModel;

use std::sync::Arc;

use support_core::{BotConfig, Provider, Result};

/// Build the completion model selected by the configuration.
///
/// Fails with a configuration error when the selected provider's API key is
/// missing from the environment.
pub fn build_completion_model(config: &BotConfig) -> Result<Arc<dyn CompletionModel>> {
    let api_key = config.llm_api_key()?;

    let model: Arc<dyn CompletionModel> = match config.llm.provider {
        Provider::OpenAi => Arc::new(OpenAiModel::new(&config.llm, api_key)?),
        Provider::Gemini => Arc::new(GeminiModel::new(&config.llm, api_key)?),
        Provider::Anthropic => Arc::new(AnthropicModel::new(&config.llm, api_key)?),
    };

    Ok(model)
}

// Re-export the trait for convenience
pub use support_core::CompletionModel;

//! Completion test doubles.

use async_trait::async_trait;

use support_core::{CompletionModel, Result, SupportError};

/// Completion model returning a fixed response, recording nothing.
pub struct StaticCompletion {
    response: String,
}

impl StaticCompletion {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl CompletionModel for StaticCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.response.clone())
    }
}

/// Completion model that always fails, for exercising fallback paths.
pub struct FailingCompletion;

#[async_trait]
impl CompletionModel for FailingCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(SupportError::completion("mock", "Simulated completion failure"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_completion() {
        let model = StaticCompletion::new("hello");
        assert_eq!(model.complete("anything").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_failing_completion() {
        let model = FailingCompletion;
        assert!(model.complete("anything").await.is_err());
    }
}

//! HyDE: Hypothetical Document Embeddings.
//!
//! Instead of embedding the literal question, ask the completion model for a
//! plausible answer and embed that. Hypothetical answers live closer to
//! knowledge-base passages in embedding space than short questions do.

use std::sync::Arc;

use support_core::{CompletionModel, Result};

/// Generates hypothetical answers for HyDE retrieval.
pub struct HydeGenerator {
    model: Arc<dyn CompletionModel>,
}

impl HydeGenerator {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Write a hypothetical answer to the question.
    ///
    /// Errors propagate; the retriever falls back to embedding the question
    /// text itself.
    pub async fn generate(&self, question: &str) -> Result<String> {
        let prompt = format!(
            "You are an expert customer support agent. Write a detailed, \
             plausible answer to the following question as if you had the \
             relevant documentation in front of you. Do not say that you lack \
             information.\n\n\
             Question: {}\n\n\
             Answer:",
            question
        );

        self.model.complete(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use support_llm::{FailingCompletion, StaticCompletion};

    #[tokio::test]
    async fn test_generate_returns_completion() {
        let generator = HydeGenerator::new(Arc::new(StaticCompletion::new(
            "You can reset your password from the login page.",
        )));

        let answer = generator.generate("How do I reset my password?").await.unwrap();
        assert_eq!(answer, "You can reset your password from the login page.");
    }

    #[tokio::test]
    async fn test_generate_propagates_failure() {
        let generator = HydeGenerator::new(Arc::new(FailingCompletion));
        assert!(generator.generate("anything").await.is_err());
    }
}

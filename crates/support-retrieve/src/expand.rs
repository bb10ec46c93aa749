//! Multi-query expansion for RAG-Fusion.

use std::sync::Arc;

use tracing::{debug, warn};

use support_core::CompletionModel;

/// Generates alternative phrasings of a question via the completion model.
///
/// Expansion is best-effort: a failed or empty completion degrades to no
/// expansion rather than failing the whole retrieval.
pub struct QueryExpander {
    model: Arc<dyn CompletionModel>,
    k_queries: usize,
}

impl QueryExpander {
    pub fn new(model: Arc<dyn CompletionModel>, k_queries: usize) -> Self {
        Self { model, k_queries }
    }

    /// Generate up to `k_queries` search queries for the question.
    ///
    /// Returns an empty vec when the completion fails or produces nothing
    /// usable; the caller falls back to searching the original question.
    pub async fn expand(&self, question: &str) -> Vec<String> {
        let prompt = format!(
            "You are a search query generator. Generate {} diverse search queries \
             that best capture the intent of the following question.\n\n\
             Question: {}\n\n\
             Generated queries (one per line):",
            self.k_queries, question
        );

        let response = match self.model.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Query expansion failed, searching the original question only: {}", e);
                return Vec::new();
            }
        };

        let queries: Vec<String> = response
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .take(self.k_queries)
            .collect();

        debug!("Expanded question into {} sub-queries", queries.len());
        queries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use support_llm::{FailingCompletion, StaticCompletion};

    #[tokio::test]
    async fn test_expand_parses_one_query_per_line() {
        let model = Arc::new(StaticCompletion::new(
            "how to reset password\n\n  forgot login credentials  \naccount recovery steps\n",
        ));
        let expander = QueryExpander::new(model, 4);

        let queries = expander.expand("I can't log in").await;
        assert_eq!(
            queries,
            vec![
                "how to reset password",
                "forgot login credentials",
                "account recovery steps",
            ]
        );
    }

    #[tokio::test]
    async fn test_expand_truncates_to_k_queries() {
        let model = Arc::new(StaticCompletion::new("a\nb\nc\nd\ne"));
        let expander = QueryExpander::new(model, 2);

        let queries = expander.expand("question").await;
        assert_eq!(queries, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_expand_failure_returns_empty() {
        let expander = QueryExpander::new(Arc::new(FailingCompletion), 4);
        assert!(expander.expand("question").await.is_empty());
    }

    #[tokio::test]
    async fn test_expand_blank_response_returns_empty() {
        let expander = QueryExpander::new(Arc::new(StaticCompletion::new("\n  \n")), 4);
        assert!(expander.expand("question").await.is_empty());
    }
}

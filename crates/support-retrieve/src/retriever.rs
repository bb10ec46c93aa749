//! The retrieval pipeline: expansion, per-query search, fusion, rerank.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::try_join_all;
use tracing::{debug, info, warn};

use support_core::vector::rank_descending_by_cosine;
use support_core::{
    Chunk, CompletionModel, Embedder, Result, RetrievalConfig, RetrievalResults, ScoredChunk,
    VectorStore,
};

use crate::expand::QueryExpander;
use crate::fusion::reciprocal_rank_fusion;
use crate::hyde::HydeGenerator;

/// Retrieves knowledge-base chunks for a question.
///
/// Every retrieval goes through rank fusion. With fusion disabled the
/// question is the only sub-query and fusing one list preserves its order,
/// so plain retrieval and RAG-Fusion share a single code path.
pub struct FusionRetriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    expander: QueryExpander,
    hyde: HydeGenerator,
    config: RetrievalConfig,
}

impl FusionRetriever {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn CompletionModel>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            expander: QueryExpander::new(model.clone(), config.k_queries),
            hyde: HydeGenerator::new(model),
            config,
        }
    }

    /// Retrieve the most relevant chunks for `question`.
    ///
    /// Store and embedding failures propagate; expansion and HyDE failures
    /// degrade to searching the literal question.
    pub async fn retrieve(&self, question: &str) -> Result<RetrievalResults> {
        let start = Instant::now();

        let queries = if self.config.fusion {
            let expanded = self.expander.expand(question).await;
            if expanded.is_empty() {
                vec![question.to_string()]
            } else {
                expanded
            }
        } else {
            vec![question.to_string()]
        };

        let searches = queries.iter().map(|query| self.search_one(query));
        let ranked_lists = try_join_all(searches).await?;

        let mut chunks = reciprocal_rank_fusion(ranked_lists, self.config.rrf_k);
        chunks.truncate(self.config.top_k);

        if self.config.rerank {
            chunks = self.rerank(question, chunks).await;
        }

        let latency_ms = start.elapsed().as_millis() as u64;
        info!(
            queries = queries.len(),
            chunks = chunks.len(),
            latency_ms,
            "Retrieval complete"
        );

        Ok(RetrievalResults {
            query: question.to_string(),
            queries_searched: queries.len(),
            latency_ms,
            chunks,
        })
    }

    /// Run one sub-query against the store, returning its ranked chunks.
    async fn search_one(&self, query: &str) -> Result<Vec<Chunk>> {
        let text_to_embed = if self.config.hyde {
            match self.hyde.generate(query).await {
                Ok(answer) => answer,
                Err(e) => {
                    warn!("HyDE generation failed, embedding the query text: {}", e);
                    query.to_string()
                }
            }
        } else {
            query.to_string()
        };

        let embedding = self.embedder.embed_query(&text_to_embed).await?;
        let scored = self.store.search(&embedding, self.config.fetch_k).await?;

        Ok(scored.into_iter().map(|s| s.chunk).collect())
    }

    /// Rerank fused candidates by cosine similarity against the question.
    ///
    /// Best-effort: any failure leaves the fused ranking untouched.
    async fn rerank(&self, question: &str, chunks: Vec<ScoredChunk>) -> Vec<ScoredChunk> {
        if chunks.len() < 2 {
            return chunks;
        }

        let mut texts: Vec<&str> = Vec::with_capacity(chunks.len() + 1);
        texts.push(question);
        texts.extend(chunks.iter().map(|s| s.chunk.content.as_str()));

        let embeddings = match self.embedder.embed_documents(&texts).await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                debug!("Rerank embedding failed, keeping fused order: {}", e);
                return chunks;
            }
        };
        if embeddings.len() != texts.len() {
            debug!("Rerank embedding count mismatch, keeping fused order");
            return chunks;
        }

        let question_embedding = &embeddings[0];
        let candidate_embeddings = &embeddings[1..];
        let ranked = match rank_descending_by_cosine(question_embedding, candidate_embeddings) {
            Ok(ranked) => ranked,
            Err(e) => {
                debug!("Rerank scoring failed, keeping fused order: {}", e);
                return chunks;
            }
        };

        let originals: Vec<Chunk> = chunks.into_iter().map(|s| s.chunk).collect();
        ranked
            .into_iter()
            .take(self.config.rerank_top_n)
            .map(|(idx, score)| ScoredChunk {
                chunk: originals[idx].clone(),
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use support_embed::MockEmbedder;
    use support_llm::{FailingCompletion, StaticCompletion};
    use support_store::MemoryStore;

    async fn indexed_store(contents: &[&str]) -> Arc<dyn VectorStore> {
        let store = MemoryStore::new();
        let embedder = MockEmbedder::new();

        let chunks: Vec<Chunk> = contents
            .iter()
            .enumerate()
            .map(|(i, content)| Chunk::new("kb.txt", i as u32, content))
            .collect();
        let embeddings = embedder.embed_documents(contents).await.unwrap();
        store.add(&chunks, &embeddings).await.unwrap();

        Arc::new(store)
    }

    fn retriever(
        store: Arc<dyn VectorStore>,
        model: Arc<dyn CompletionModel>,
        config: RetrievalConfig,
    ) -> FusionRetriever {
        FusionRetriever::new(store, Arc::new(MockEmbedder::new()), model, config)
    }

    #[tokio::test]
    async fn test_plain_retrieval_finds_exact_match() {
        let store = indexed_store(&["alpha", "beta", "gamma"]).await;
        let r = retriever(store, Arc::new(FailingCompletion), RetrievalConfig::default());

        let results = r.retrieve("alpha").await.unwrap();
        assert_eq!(results.queries_searched, 1);
        assert_eq!(results.chunks[0].chunk.content, "alpha");
    }

    #[tokio::test]
    async fn test_expansion_failure_matches_fusion_disabled() {
        let store = indexed_store(&["alpha", "beta", "gamma"]).await;

        let mut fused_config = RetrievalConfig::default();
        fused_config.fusion = true;
        let fused = retriever(store.clone(), Arc::new(FailingCompletion), fused_config)
            .retrieve("alpha")
            .await
            .unwrap();

        let plain = retriever(
            store,
            Arc::new(FailingCompletion),
            RetrievalConfig::default(),
        )
        .retrieve("alpha")
        .await
        .unwrap();

        assert_eq!(fused.queries_searched, 1);
        let fused_contents: Vec<_> = fused.chunks.iter().map(|s| &s.chunk.content).collect();
        let plain_contents: Vec<_> = plain.chunks.iter().map(|s| &s.chunk.content).collect();
        assert_eq!(fused_contents, plain_contents);
    }

    #[tokio::test]
    async fn test_fusion_searches_expanded_queries() {
        let store = indexed_store(&["alpha", "beta", "gamma"]).await;

        let mut config = RetrievalConfig::default();
        config.fusion = true;
        // Expansion always yields these two sub-queries.
        let r = retriever(store, Arc::new(StaticCompletion::new("alpha\nbeta")), config);

        let results = r.retrieve("something else entirely").await.unwrap();
        assert_eq!(results.queries_searched, 2);

        let contents: Vec<_> = results.chunks.iter().map(|s| &s.chunk.content).collect();
        assert!(contents.contains(&&"alpha".to_string()));
        assert!(contents.contains(&&"beta".to_string()));
    }

    #[tokio::test]
    async fn test_hyde_embeds_hypothetical_answer() {
        let store = indexed_store(&["alpha", "beta", "gamma"]).await;

        let mut config = RetrievalConfig::default();
        config.hyde = true;
        // The hypothetical answer is "beta", so searching "alpha" should land
        // on the "beta" chunk.
        let r = retriever(store, Arc::new(StaticCompletion::new("beta")), config);

        let results = r.retrieve("alpha").await.unwrap();
        assert_eq!(results.chunks[0].chunk.content, "beta");
    }

    #[tokio::test]
    async fn test_hyde_failure_falls_back_to_literal_query() {
        let store = indexed_store(&["alpha", "beta", "gamma"]).await;

        let mut config = RetrievalConfig::default();
        config.hyde = true;
        let r = retriever(store, Arc::new(FailingCompletion), config);

        let results = r.retrieve("alpha").await.unwrap();
        assert_eq!(results.chunks[0].chunk.content, "alpha");
    }

    #[tokio::test]
    async fn test_top_k_bounds_result_size() {
        let store = indexed_store(&["a", "b", "c", "d", "e", "f"]).await;

        let mut config = RetrievalConfig::default();
        config.top_k = 2;
        let r = retriever(store, Arc::new(FailingCompletion), config);

        let results = r.retrieve("a").await.unwrap();
        assert_eq!(results.chunks.len(), 2);
    }

    #[tokio::test]
    async fn test_rerank_keeps_most_similar_first() {
        let store = indexed_store(&["alpha", "beta", "gamma"]).await;

        let mut config = RetrievalConfig::default();
        config.rerank = true;
        config.rerank_top_n = 2;
        let r = retriever(store, Arc::new(FailingCompletion), config);

        let results = r.retrieve("alpha").await.unwrap();
        assert_eq!(results.chunks.len(), 2);
        // The identical text embeds identically, cosine 1.0.
        assert_eq!(results.chunks[0].chunk.content, "alpha");
        assert!((results.chunks[0].score - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_results() {
        let store = indexed_store(&[]).await;
        let r = retriever(store, Arc::new(FailingCompletion), RetrievalConfig::default());

        let results = r.retrieve("anything").await.unwrap();
        assert!(results.chunks.is_empty());
    }
}

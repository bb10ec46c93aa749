//! In-memory vector store.

use std::sync::RwLock;

use async_trait::async_trait;

use support_core::vector::cosine_similarity;
use support_core::{Chunk, Result, ScoredChunk, SupportError, VectorStore};

/// In-process vector store: chunks and their embeddings in a single vec,
/// searched by brute-force cosine scan.
pub struct MemoryStore {
    entries: RwLock<Vec<(Chunk, Vec<f32>)>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn add(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(SupportError::invalid_argument(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|e| SupportError::store(e.to_string()))?;

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            entries.push((chunk.clone(), embedding.clone()));
        }

        tracing::debug!("Memory store now holds {} chunks", entries.len());

        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| SupportError::store(e.to_string()))?;

        let mut scored = Vec::with_capacity(entries.len());
        for (chunk, candidate) in entries.iter() {
            let score = cosine_similarity(embedding, candidate)?;
            scored.push(ScoredChunk {
                chunk: chunk.clone(),
                score,
            });
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|e| SupportError::store(e.to_string()))?;
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> Chunk {
        Chunk::new("kb.txt", 0, content)
    }

    #[tokio::test]
    async fn test_add_and_count() {
        let store = MemoryStore::new();
        assert_eq!(store.count().await.unwrap(), 0);

        store
            .add(
                &[chunk("a"), chunk("b")],
                &[vec![1.0, 0.0], vec![0.0, 1.0]],
            )
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = MemoryStore::new();
        store
            .add(
                &[chunk("east"), chunk("north"), chunk("northeast")],
                &[
                    vec![1.0, 0.0],
                    vec![0.0, 1.0],
                    vec![0.7, 0.7],
                ],
            )
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "east");
        assert_eq!(results[1].chunk.content, "northeast");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_add_rejects_length_mismatch() {
        let store = MemoryStore::new();
        let result = store.add(&[chunk("a")], &[]).await;
        assert!(result.is_err());
    }
}

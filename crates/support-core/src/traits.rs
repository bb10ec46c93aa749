//! Core traits defining the interfaces between components.
//!
//! Everything the retrieval core talks to - vector store, embedding service,
//! completion service, chunker - sits behind one of these seams so the
//! retrieval logic stays independent of any concrete backend.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Chunk, ScoredChunk};

/// Vector store boundary: indexing and similarity search.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Index chunks with their embedding vectors.
    ///
    /// `chunks` and `embeddings` must have the same length.
    async fn add(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<()>;

    /// Return the `top_k` nearest chunks by cosine similarity, closest first.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>>;

    /// Number of chunks currently indexed.
    async fn count(&self) -> Result<usize>;
}

/// Embedding service boundary.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of document texts.
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

/// Completion service boundary: one prompt in, one text out.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Run a single completion request.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Chunking configuration.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum tokens per chunk.
    pub max_tokens: usize,

    /// Minimum tokens per chunk (avoid tiny chunks).
    pub min_tokens: usize,

    /// Token overlap between consecutive chunks.
    pub overlap_tokens: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            min_tokens: 10,
            overlap_tokens: 50,
        }
    }
}

/// Chunking strategy trait.
pub trait Chunker: Send + Sync {
    /// Chunk text content into pieces.
    fn chunk(&self, content: &str, config: &ChunkConfig) -> Result<Vec<ChunkData>>;
}

/// Raw chunk data before ID assignment.
#[derive(Debug, Clone)]
pub struct ChunkData {
    /// Chunk text content.
    pub content: String,

    /// Token count (estimated).
    pub token_count: usize,
}

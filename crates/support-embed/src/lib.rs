//! support-embed - Embedding service client
//!
//! Text embeddings via an OpenAI-compatible `/v1/embeddings` endpoint.
//! Indexing and search both go through the [`Embedder`] trait, so tests and
//! offline runs can swap in the deterministic [`MockEmbedder`].

mod http;
mod mock;

pub use http::HttpEmbedder;
pub use mock::MockEmbedder;

// Re-export the Embedder trait for convenience
pub use support_core::Embedder;

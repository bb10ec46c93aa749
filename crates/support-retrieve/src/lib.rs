//! support-retrieve - Advanced retrieval strategies
//!
//! The retrieval core of the chatbot:
//!
//! - Multi-query expansion (RAG-Fusion): ask the completion model for
//!   several phrasings of the question and search with each one.
//! - Reciprocal Rank Fusion: combine the per-query ranked lists into one
//!   ranking.
//! - HyDE: embed a hypothetical answer instead of the literal question.
//! - Optional embedding-based rerank of the fused candidates.
//!
//! # Example
//!
//! ```rust,ignore
//! use support_retrieve::FusionRetriever;
//!
//! let retriever = FusionRetriever::new(store, embedder, model, config);
//! let results = retriever.retrieve("How do I reset my password?").await?;
//! ```

mod expand;
mod fusion;
mod hyde;
mod retriever;

pub use expand::QueryExpander;
pub use fusion::{reciprocal_rank_fusion, DEFAULT_RRF_K};
pub use hyde::HydeGenerator;
pub use retriever::FusionRetriever;

// Re-export for convenience
pub use support_core::{RetrievalConfig, RetrievalResults, ScoredChunk};

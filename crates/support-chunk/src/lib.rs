//! support-chunk - Chunking for the knowledge base
//!
//! Splits the support corpus into overlapping pieces sized for embedding.
//!
//! # Example
//!
//! ```rust
//! use support_chunk::RecursiveChunker;
//! use support_core::{ChunkConfig, Chunker};
//!
//! let chunker = RecursiveChunker::new();
//! let config = ChunkConfig::default();
//! let chunks = chunker.chunk("Hello world", &config).unwrap();
//! ```

mod recursive;

pub use recursive::RecursiveChunker;

// Re-export types for convenience
pub use support_core::{ChunkConfig, ChunkData, Chunker};

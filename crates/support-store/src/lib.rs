//! support-store - Vector store backends
//!
//! Two implementations of the [`VectorStore`] trait:
//!
//! - [`MemoryStore`]: in-process, rebuilt from the knowledge base on every
//!   start. The default for a small support corpus.
//! - [`SqliteStore`]: chunks and embedding vectors persisted in SQLite,
//!   surviving restarts under the configured persistence directory.
//!
//! Both rank by cosine similarity over the full index; a fixed support
//! corpus is small enough that a brute-force scan is the simplest correct
//! choice.

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use support_core::{Result, StoreBackend, StoreConfig};

/// Build the vector store selected by the configuration.
pub fn build_store(config: &StoreConfig) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Sqlite => Arc::new(SqliteStore::open(&config.path)?),
    };
    Ok(store)
}

// Re-export the trait for convenience
pub use support_core::VectorStore;

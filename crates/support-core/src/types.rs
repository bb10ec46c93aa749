//! Core domain types for the support chatbot.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// A chunk of the knowledge base: the unit of retrieval.
///
/// Chunk content doubles as its identity during rank fusion: two chunks with
/// the same text are the same piece of knowledge even if they were indexed
/// separately. The source and index are metadata that ride along.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier (ULID).
    pub id: Ulid,

    /// Where the chunk came from (file path or label).
    pub source: String,

    /// Index within the source (0-based).
    pub chunk_index: u32,

    /// Chunk text content.
    pub content: String,

    /// Blake3 hash of chunk content.
    #[serde(with = "serde_bytes_opt")]
    pub content_hash: Option<[u8; 32]>,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(source: &str, chunk_index: u32, content: &str) -> Self {
        let content_hash = blake3::hash(content.as_bytes());

        Self {
            id: Ulid::new(),
            source: source.to_string(),
            chunk_index,
            content: content.to_string(),
            content_hash: Some(*content_hash.as_bytes()),
        }
    }
}

/// A chunk paired with a relevance score.
///
/// Produced by similarity search (cosine similarity, higher is better) and by
/// rank fusion (accumulated RRF score). Position in a result list encodes
/// rank, 0 being the most relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The matched chunk.
    pub chunk: Chunk,

    /// Relevance score (higher is better).
    pub score: f32,
}

/// Retrieval results container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResults {
    /// The original question.
    pub query: String,

    /// Number of sub-queries that were searched.
    pub queries_searched: usize,

    /// Retrieval latency in milliseconds.
    pub latency_ms: u64,

    /// Ranked chunks, most relevant first.
    pub chunks: Vec<ScoredChunk>,
}

/// Helper module for optional byte array serialization.
mod serde_bytes_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<[u8; 32]>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => {
                let hex = hex::encode(bytes);
                hex.serialize(serializer)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<[u8; 32]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            Some(hex) => {
                let bytes = hex::decode(&hex).map_err(serde::de::Error::custom)?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("invalid hash length"))?;
                Ok(Some(arr))
            }
            None => Ok(None),
        }
    }
}

//! SQLite-backed vector store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags};
use tracing::info;
use ulid::Ulid;

use support_core::vector::cosine_similarity;
use support_core::{Chunk, Result, ScoredChunk, SupportError, VectorStore};

use crate::schema::SCHEMA;

/// SQLite-backed store implementation.
///
/// Chunks and their embedding vectors live in one table; search loads the
/// vectors and ranks them in Rust. Uses a blocking Mutex around the
/// connection, which is fine for a single-index workload.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

// Manually implement Send + Sync since Connection is protected by Mutex
unsafe impl Send for SqliteStore {}
unsafe impl Sync for SqliteStore {}

impl SqliteStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| SupportError::store(format!("Failed to open database: {}", e)))?;

        Self::init(conn, path)
    }

    /// Open an in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SupportError::store(format!("Failed to open in-memory database: {}", e)))?;

        Self::init(conn, Path::new(":memory:"))
    }

    fn init(conn: Connection, path: &Path) -> Result<Self> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 30000;
            "#,
        )
        .map_err(|e| SupportError::store(format!("Failed to configure connection: {}", e)))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| SupportError::store(format!("Failed to initialize schema: {}", e)))?;

        info!("Vector index opened at {:?}", path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute a blocking operation on the connection.
    fn with_conn<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SupportError::store(e.to_string()))?;
        f(&conn)
    }
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for v in embedding {
        blob.extend_from_slice(&v.to_le_bytes());
    }
    blob
}

fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn add(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(SupportError::invalid_argument(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        self.with_conn(|conn| {
            for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
                conn.execute(
                    "INSERT OR REPLACE INTO chunks (id, source, chunk_index, content, content_hash, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        chunk.id.to_string(),
                        chunk.source,
                        chunk.chunk_index,
                        chunk.content,
                        chunk.content_hash.map(|h| h.to_vec()),
                        embedding_to_blob(embedding),
                    ],
                )
                .map_err(|e| SupportError::store(format!("Failed to insert chunk: {}", e)))?;
            }
            Ok(())
        })
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        let mut scored = self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, source, chunk_index, content, content_hash, embedding FROM chunks",
                )
                .map_err(|e| SupportError::store(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| {
                    let id: String = row.get(0)?;
                    let source: String = row.get(1)?;
                    let chunk_index: u32 = row.get(2)?;
                    let content: String = row.get(3)?;
                    let content_hash: Option<Vec<u8>> = row.get(4)?;
                    let blob: Vec<u8> = row.get(5)?;
                    Ok((id, source, chunk_index, content, content_hash, blob))
                })
                .map_err(|e| SupportError::store(e.to_string()))?;

            let mut scored = Vec::new();
            for row in rows {
                let (id, source, chunk_index, content, content_hash, blob) =
                    row.map_err(|e| SupportError::store(e.to_string()))?;

                let id = Ulid::from_string(&id)
                    .map_err(|e| SupportError::store(format!("Bad chunk id: {}", e)))?;
                let content_hash = match content_hash {
                    Some(bytes) => Some(bytes.try_into().map_err(|_| {
                        SupportError::store("Bad content hash length".to_string())
                    })?),
                    None => None,
                };

                let candidate = blob_to_embedding(&blob);
                let score = cosine_similarity(embedding, &candidate)?;

                scored.push(ScoredChunk {
                    chunk: Chunk {
                        id,
                        source,
                        chunk_index,
                        content,
                        content_hash,
                    },
                    score,
                });
            }
            Ok(scored)
        })?;

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
                .map_err(|e| SupportError::store(e.to_string()))?;
            Ok(count as usize)
        })
    }
}

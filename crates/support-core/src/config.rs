//! Configuration types for the support chatbot.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, SupportError};

/// Environment variable holding the embedding service API key.
pub const EMBEDDING_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Completion provider, selected explicitly at configuration load.
///
/// A closed enum: an unrecognized provider name fails when the config is
/// parsed, not at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
    Anthropic,
}

impl Provider {
    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
        };
        write!(f, "{}", s)
    }
}

/// Main configuration for the support chatbot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Completion model configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embedding service configuration.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Retrieval configuration.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Chunking configuration.
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Path to the knowledge base text file.
    #[serde(default = "default_knowledge_base")]
    pub knowledge_base: PathBuf,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            store: StoreConfig::default(),
            retrieval: RetrievalConfig::default(),
            chunking: ChunkingConfig::default(),
            knowledge_base: default_knowledge_base(),
            server: ServerConfig::default(),
        }
    }
}

/// Completion model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Which provider to use.
    #[serde(default = "default_provider")]
    pub provider: Provider,

    /// Model identifier at the provider.
    #[serde(default = "default_model")]
    pub model: String,

    /// Override for the provider's API base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Embedding service configuration (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model identifier.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// API base URL.
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            base_url: default_embedding_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Vector store backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store, rebuilt on every start.
    Memory,
    /// SQLite-backed store persisted under `store.path`.
    Sqlite,
}

/// Vector store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend to use.
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,

    /// Path to the SQLite index (ignored by the memory backend).
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
        }
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks handed to answer synthesis.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Per-sub-query retrieval depth (fetch more than top_k for fusion).
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// Enable RAG-Fusion (multi-query retrieval joined by RRF).
    #[serde(default)]
    pub fusion: bool,

    /// Number of query variants to generate for fusion.
    #[serde(default = "default_k_queries")]
    pub k_queries: usize,

    /// RRF smoothing constant: higher values discount low ranks less steeply.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f32,

    /// Enable HyDE (search with the embedding of a hypothetical answer).
    #[serde(default)]
    pub hyde: bool,

    /// Enable the embedding-based rerank pass after retrieval.
    #[serde(default)]
    pub rerank: bool,

    /// Number of chunks kept after reranking.
    #[serde(default = "default_rerank_top_n")]
    pub rerank_top_n: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            fetch_k: default_fetch_k(),
            fusion: false,
            k_queries: default_k_queries(),
            rrf_k: default_rrf_k(),
            hyde: false,
            rerank: false,
            rerank_top_n: default_rerank_top_n(),
        }
    }
}

/// Chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum tokens per chunk.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Minimum tokens per chunk.
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,

    /// Token overlap between consecutive chunks.
    #[serde(default = "default_overlap_tokens")]
    pub overlap_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            min_tokens: default_min_tokens(),
            overlap_tokens: default_overlap_tokens(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP API.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

// Default value functions

fn default_provider() -> Provider {
    Provider::OpenAi
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("support-rag")
        .join("index.db")
}

fn default_top_k() -> usize {
    4
}

fn default_fetch_k() -> usize {
    10
}

fn default_k_queries() -> usize {
    4
}

fn default_rrf_k() -> f32 {
    60.0
}

fn default_rerank_top_n() -> usize {
    5
}

fn default_max_tokens() -> usize {
    512
}

fn default_min_tokens() -> usize {
    10
}

fn default_overlap_tokens() -> usize {
    50
}

fn default_knowledge_base() -> PathBuf {
    PathBuf::from("data/knowledge_base.txt")
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

impl BotConfig {
    /// Load configuration from file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| SupportError::config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load configuration from default paths.
    pub fn load_default() -> Result<Self> {
        // Try user config first
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("support-rag").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        // Try local config
        let local_config = PathBuf::from("support-rag.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        // Return defaults
        Ok(Self::default())
    }

    /// Check that every credential the selected backends need is present.
    ///
    /// A missing key for the selected provider is a startup-time fatal error,
    /// never a per-query one.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(|var| std::env::var(var).ok())
    }

    fn validate_with<F>(&self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm_var = self.llm.provider.api_key_var();
        if lookup(llm_var).map(|v| v.trim().is_empty()).unwrap_or(true) {
            return Err(SupportError::config(format!(
                "Missing API key for provider '{}': set {}",
                self.llm.provider, llm_var
            )));
        }

        if lookup(EMBEDDING_API_KEY_VAR)
            .map(|v| v.trim().is_empty())
            .unwrap_or(true)
        {
            return Err(SupportError::config(format!(
                "Missing embedding API key: set {}",
                EMBEDDING_API_KEY_VAR
            )));
        }

        if self.retrieval.k_queries == 0 {
            return Err(SupportError::config("retrieval.k_queries must be >= 1"));
        }
        if self.retrieval.rrf_k <= 0.0 {
            return Err(SupportError::config("retrieval.rrf_k must be positive"));
        }
        if self.chunking.max_tokens == 0 {
            return Err(SupportError::config("chunking.max_tokens must be >= 1"));
        }

        Ok(())
    }

    /// API key for the selected completion provider.
    pub fn llm_api_key(&self) -> Result<String> {
        let var = self.llm.provider.api_key_var();
        std::env::var(var)
            .map_err(|_| SupportError::config(format!("Missing API key: set {}", var)))
    }

    /// API key for the embedding service.
    pub fn embedding_api_key(&self) -> Result<String> {
        std::env::var(EMBEDDING_API_KEY_VAR).map_err(|_| {
            SupportError::config(format!("Missing API key: set {}", EMBEDDING_API_KEY_VAR))
        })
    }
}

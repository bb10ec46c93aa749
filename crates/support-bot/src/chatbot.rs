//! Chatbot assembly: knowledge-base ingestion and answer synthesis.

use std::sync::Arc;

use tracing::{info, warn};

use support_chunk::RecursiveChunker;
use support_core::{
    BotConfig, Chunk, ChunkConfig, Chunker, CompletionModel, Embedder, Result, SupportError,
    VectorStore,
};
use support_embed::HttpEmbedder;
use support_llm::build_completion_model;
use support_retrieve::FusionRetriever;
use support_store::build_store;

use crate::memory::ConversationTurn;
use crate::prompt::build_synthesis_prompt;

/// Reply for an empty or whitespace-only question.
pub const EMPTY_QUERY_REPLY: &str = "Please provide a question so I can help you.";

/// Reply when retrieval or synthesis fails. Callers never see the error.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I wasn't able to process your question just now. Please try again in a moment.";

/// The assembled chatbot: indexed knowledge base, retriever and completion
/// model behind one `answer` call.
pub struct Chatbot {
    store: Arc<dyn VectorStore>,
    retriever: FusionRetriever,
    model: Arc<dyn CompletionModel>,
}

impl std::fmt::Debug for Chatbot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chatbot").finish_non_exhaustive()
    }
}

impl Chatbot {
    /// Build a chatbot from configuration, constructing the real store,
    /// embedder and completion provider.
    pub async fn from_config(config: &BotConfig) -> Result<Self> {
        let store = build_store(&config.store)?;
        let embedder = Arc::new(HttpEmbedder::new(
            &config.embedding,
            config.embedding_api_key()?,
        )?);
        let model = build_completion_model(config)?;

        Self::build(config, store, embedder, model).await
    }

    /// Build a chatbot over the given backends: read the knowledge-base file,
    /// chunk it, embed the chunks and index them.
    ///
    /// A missing or empty knowledge base is fatal: the chatbot is not
    /// constructed and no query is ever served from it.
    pub async fn build(
        config: &BotConfig,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn CompletionModel>,
    ) -> Result<Self> {
        let path = &config.knowledge_base;
        let text = std::fs::read_to_string(path).map_err(|e| {
            SupportError::knowledge_base(format!(
                "Failed to read knowledge base {}: {}",
                path.display(),
                e
            ))
        })?;
        if text.trim().is_empty() {
            return Err(SupportError::knowledge_base(format!(
                "Knowledge base {} is empty",
                path.display()
            )));
        }

        let chunk_config = ChunkConfig {
            max_tokens: config.chunking.max_tokens,
            min_tokens: config.chunking.min_tokens,
            overlap_tokens: config.chunking.overlap_tokens,
        };
        let chunker = RecursiveChunker::new();
        let chunk_data = chunker.chunk(&text, &chunk_config)?;
        if chunk_data.is_empty() {
            return Err(SupportError::knowledge_base(format!(
                "Knowledge base {} produced no chunks",
                path.display()
            )));
        }

        let source = path.display().to_string();
        let chunks: Vec<Chunk> = chunk_data
            .iter()
            .enumerate()
            .map(|(i, data)| Chunk::new(&source, i as u32, &data.content))
            .collect();

        let texts: Vec<&str> = chunk_data.iter().map(|d| d.content.as_str()).collect();
        let embeddings = embedder.embed_documents(&texts).await?;
        store.add(&chunks, &embeddings).await?;

        info!(chunks = chunks.len(), source = %source, "Knowledge base indexed");

        let retriever = FusionRetriever::new(
            store.clone(),
            embedder,
            model.clone(),
            config.retrieval.clone(),
        );

        Ok(Self {
            store,
            retriever,
            model,
        })
    }

    /// Answer a question against the indexed knowledge base.
    ///
    /// Never fails: an empty question gets a fixed prompt-for-input reply,
    /// and retrieval or synthesis failures degrade to a fixed apology.
    pub async fn answer(&self, query: &str, history: &[ConversationTurn]) -> String {
        if query.trim().is_empty() {
            return EMPTY_QUERY_REPLY.to_string();
        }

        let results = match self.retriever.retrieve(query).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Retrieval failed: {}", e);
                return FALLBACK_REPLY.to_string();
            }
        };

        let prompt = build_synthesis_prompt(query, &results.chunks, history);
        match self.model.complete(&prompt).await {
            Ok(answer) => answer.trim().to_string(),
            Err(e) => {
                warn!("Answer synthesis failed: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Number of chunks in the index.
    pub async fn chunk_count(&self) -> Result<usize> {
        self.store.count().await
    }
}

//! Error types for the support chatbot.

use thiserror::Error;

/// Result type alias using SupportError.
pub type Result<T> = std::result::Result<T, SupportError>;

/// Errors that can occur in the support-rag system.
#[derive(Error, Debug)]
pub enum SupportError {
    /// Configuration error (missing credential, bad selector). Fatal at startup.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Knowledge base could not be loaded or produced no chunks.
    /// Fatal at chatbot construction.
    #[error("Knowledge base error: {message}")]
    KnowledgeBase { message: String },

    /// Completion service call failed (network, timeout, quota, bad payload).
    #[error("Completion error from {provider}: {message}")]
    Completion { provider: String, message: String },

    /// Embedding service call failed.
    #[error("Embedding error: {message}")]
    Embedding { message: String },

    /// Vector store error.
    #[error("Store error: {message}")]
    Store { message: String },

    /// Invalid argument provided.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SupportError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a knowledge base error.
    pub fn knowledge_base(message: impl Into<String>) -> Self {
        Self::KnowledgeBase {
            message: message.into(),
        }
    }

    /// Create a completion error.
    pub fn completion(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Completion {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// True for errors that prevent the service from starting at all,
    /// as opposed to per-query upstream failures.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::KnowledgeBase { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SupportError::completion("openai", "timeout");
        assert!(err.to_string().contains("openai"));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(SupportError::config("missing key").is_fatal());
        assert!(SupportError::knowledge_base("empty corpus").is_fatal());
        assert!(!SupportError::embedding("503").is_fatal());
        assert!(!SupportError::completion("gemini", "quota").is_fatal());
    }
}

//! Shared application state.

use std::sync::Arc;

use support_bot::{Chatbot, SessionStore};

/// Whether the chatbot came up.
///
/// Construction can fail (missing knowledge base, bad credentials) while the
/// HTTP server still runs: a failed bot serves health checks and a fixed 503
/// on queries instead of taking the process down.
pub enum BotState {
    Ready(Arc<Chatbot>),
    Failed(String),
}

/// State shared by every handler.
pub struct AppState {
    pub bot: BotState,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(bot: BotState) -> Self {
        Self {
            bot,
            sessions: SessionStore::new(),
        }
    }
}

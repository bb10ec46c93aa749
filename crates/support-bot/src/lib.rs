//! support-bot - Chatbot assembly
//!
//! Wires the knowledge-base pipeline together: read and chunk the corpus,
//! embed and index it, then answer questions by retrieving context and
//! prompting the completion model. Also owns conversation memory: a bounded
//! TTL session store whose turn history is rendered into the synthesis
//! prompt.
//!
//! Answering is total: an empty question, a failed retrieval or a failed
//! completion each map to a fixed reply, never an error.

mod chatbot;
mod memory;
mod prompt;

pub use chatbot::{Chatbot, EMPTY_QUERY_REPLY, FALLBACK_REPLY};
pub use memory::{ConversationTurn, Session, SessionStore};
pub use prompt::build_synthesis_prompt;

//! Synthesis prompt assembly.

use support_core::ScoredChunk;

use crate::memory::ConversationTurn;

/// System instruction for answer synthesis. The model is told to stay inside
/// the retrieved context so it cannot invent policy details.
const SYSTEM_INSTRUCTION: &str = "You are a helpful customer support agent. \
Answer the customer's question using only the information in the context \
below. If the context does not contain the answer, say so and suggest \
contacting support. Be concise and polite.";

/// Build the full synthesis prompt: system instruction, context block,
/// conversation history, then the question.
pub fn build_synthesis_prompt(
    question: &str,
    context: &[ScoredChunk],
    history: &[ConversationTurn],
) -> String {
    let mut prompt = String::from(SYSTEM_INSTRUCTION);

    prompt.push_str("\n\nContext:\n");
    if context.is_empty() {
        prompt.push_str("(no relevant documentation was found)\n");
    } else {
        for (i, scored) in context.iter().enumerate() {
            prompt.push_str(&format!("[{}] {}\n", i + 1, scored.chunk.content));
        }
    }

    if !history.is_empty() {
        prompt.push_str("\nConversation so far:\n");
        for turn in history {
            prompt.push_str(&format!("Customer: {}\n", turn.query));
            prompt.push_str(&format!("Agent: {}\n", turn.response));
        }
    }

    prompt.push_str(&format!("\nCustomer question: {}\n\nAnswer:", question));
    prompt
}

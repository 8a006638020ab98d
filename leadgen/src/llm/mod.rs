//! Completion service abstraction used by agent steps and the lead-finder tool.
//!
//! An agent step hands the full conversation history, the specs of the agent's bound
//! tools and its system instruction to a [`CompletionService`] and gets back one
//! assistant message, possibly carrying tool-call requests.
//!
//! Implementations: [`ChatOpenAI`] (any OpenAI-compatible `/chat/completions` endpoint,
//! including Perplexity) and [`MockLlm`] (scripted replies for tests and offline runs).

mod mock;
mod openai;

pub use mock::{MockLlm, MockReply, RecordedRequest};
pub use openai::{ChatOpenAI, DEFAULT_OPENAI_BASE_URL, PERPLEXITY_BASE_URL};

use async_trait::async_trait;

use crate::error::CompletionError;
use crate::message::Message;
use crate::tools::ToolSpec;

/// Language-model backend: history in, one assistant message out.
///
/// The returned message has role `assistant` and no sender name; the agent tags it.
/// When the backend produces both text and tool calls, the message carries both and
/// the router sends it to tool execution. Implementations never retry internally.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        history: &[Message],
        tools: &[ToolSpec],
        system_instruction: &str,
    ) -> Result<Message, CompletionError>;
}

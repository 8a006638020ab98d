//! Agent node: nudge if needed, call the completion service, append the tagged reply.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::AgentSpec;
use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::CompletionService;
use crate::message::Message;
use crate::prompts::{assemble_system_prompt, PROCEED_NUDGE};
use crate::state::ConversationState;
use crate::tools::ToolSpec;

/// One agent as a graph node.
///
/// A step:
/// 1. appends the user nudge when the last message is not from the user;
/// 2. calls the completion service with the full history, the agent's tool specs and
///    its assembled system instruction;
/// 3. tags the reply with the agent name and appends it;
/// 4. sets `sender` to the agent name.
///
/// A `CompletionError` aborts the step (and the run).
pub struct AgentNode {
    name: String,
    system_instruction: String,
    tool_specs: Vec<ToolSpec>,
    llm: Arc<dyn CompletionService>,
}

impl AgentNode {
    /// Builds the node for `spec`; `tool_specs` are the specs of its bound tools, in order.
    pub fn new(spec: &AgentSpec, tool_specs: Vec<ToolSpec>) -> Self {
        Self {
            name: spec.name.clone(),
            system_instruction: assemble_system_prompt(&spec.tools, &spec.instruction),
            tool_specs,
            llm: spec.llm.clone(),
        }
    }

    /// Runs one agent step and returns the new state.
    pub async fn step(&self, state: ConversationState) -> Result<ConversationState, AgentError> {
        let state = match state.last_message() {
            Some(m) if m.is_user() => state,
            _ => state.with_message(Message::user(PROCEED_NUDGE)),
        };

        let reply = self
            .llm
            .complete(state.messages(), &self.tool_specs, &self.system_instruction)
            .await?;
        tracing::debug!(
            agent = %self.name,
            tool_calls = reply.tool_calls.len(),
            content_len = reply.content.len(),
            "agent replied"
        );

        Ok(state
            .with_message(reply.with_name(self.name.clone()))
            .with_sender(self.name.clone()))
    }
}

#[async_trait]
impl Node<ConversationState> for AgentNode {
    fn id(&self) -> &str {
        &self.name
    }

    async fn run(
        &self,
        state: ConversationState,
    ) -> Result<(ConversationState, Next), AgentError> {
        let state = self.step(state).await?;
        Ok((state, Next::Continue))
    }
}

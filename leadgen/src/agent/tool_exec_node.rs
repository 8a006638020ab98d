//! Tool-execution node: runs the tool calls of the last message, in request order.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AgentError, ToolError};
use crate::graph::{Next, Node};
use crate::message::{Message, ToolCall};
use crate::state::ConversationState;
use crate::tools::ToolRegistry;

/// Id of the shared tool-execution node.
pub const TOOL_NODE: &str = "call_tool";

/// Executes pending tool calls and appends one `tool` message per call.
///
/// A call is only executed when the tool is bound to the requesting agent (`sender`);
/// anything else is answered with a `NotFound` error payload. Tool failures never
/// abort the run: they become `{"error": {"kind", "detail"}}` messages the agent can
/// read. `sender` is left unchanged so routing returns to the requesting agent.
pub struct ToolExecNode {
    registry: ToolRegistry,
    bindings: HashMap<String, HashSet<String>>,
}

impl ToolExecNode {
    /// `bindings` maps agent name to the tool names it may call.
    pub fn new(registry: ToolRegistry, bindings: HashMap<String, HashSet<String>>) -> Self {
        Self { registry, bindings }
    }

    fn is_bound(&self, agent: Option<&str>, tool: &str) -> bool {
        agent
            .and_then(|a| self.bindings.get(a))
            .is_some_and(|tools| tools.contains(tool))
    }

    async fn execute(&self, agent: Option<&str>, call: &ToolCall) -> Result<Value, ToolError> {
        if !self.is_bound(agent, &call.name) {
            return Err(ToolError::not_found(format!(
                "tool '{}' is not available to agent '{}'",
                call.name,
                agent.unwrap_or("<none>")
            )));
        }
        self.registry.call(&call.name, call.arguments.clone()).await
    }
}

fn result_content(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[async_trait]
impl Node<ConversationState> for ToolExecNode {
    fn id(&self) -> &str {
        TOOL_NODE
    }

    async fn run(
        &self,
        state: ConversationState,
    ) -> Result<(ConversationState, Next), AgentError> {
        let calls: Vec<ToolCall> = state
            .last_message()
            .map(|m| m.tool_calls.clone())
            .unwrap_or_default();
        let agent = state.sender().map(str::to_string);

        let mut state = state;
        for call in &calls {
            let content = match self.execute(agent.as_deref(), call).await {
                Ok(value) => {
                    debug!(tool = %call.name, call_id = %call.id, "tool call succeeded");
                    result_content(value)
                }
                Err(err) => {
                    warn!(tool = %call.name, call_id = %call.id, error = %err, "tool call failed");
                    err.to_payload().to_string()
                }
            };
            state = state.with_message(Message::tool(call.id.clone(), call.name.clone(), content));
        }
        Ok((state, Next::Continue))
    }
}

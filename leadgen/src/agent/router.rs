//! Routing decision after an agent step.

use crate::state::ConversationState;

/// Where to go after an agent ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// No pending tool calls: hand over to the next agent (or finish).
    Continue,
    /// The last message requests tools: run `call_tool`.
    CallTool,
}

impl Route {
    /// Path-map key used in conditional edges.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::CallTool => "call_tool",
        }
    }
}

/// `CallTool` iff the most recent message carries at least one tool-call request.
pub fn route(state: &ConversationState) -> Route {
    match state.last_message() {
        Some(m) if m.has_tool_calls() => Route::CallTool,
        _ => Route::Continue,
    }
}

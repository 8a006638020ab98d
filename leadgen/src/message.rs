//! Message types for the conversation.
//!
//! Roles: `user` (operator input and agent nudges), `assistant` (agent replies, possibly
//! carrying tool-call requests), `tool` (results of tool calls, correlated by request id).
//! A message is never edited after it is appended to a [`ConversationState`](crate::state::ConversationState).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// A request from the model to invoke one tool.
///
/// `id` correlates the request with the `tool` message that answers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Sender name: the agent for assistant messages, the tool for tool messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Pending tool-call requests (assistant messages only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool messages: id of the request this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates a plain assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates an assistant message that requests tool calls.
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::assistant(content)
        }
    }

    /// Creates a tool message answering the request `call_id` of tool `tool_name`.
    pub fn tool(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            name: Some(tool_name.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }

    /// Returns the same message tagged with `name` as sender.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Constructors set the expected role and correlation fields.
    #[test]
    fn constructors_set_roles() {
        assert_eq!(Message::user("u").role, Role::User);
        assert_eq!(Message::assistant("a").role, Role::Assistant);
        let t = Message::tool("call-1", "LeadExtractor", "{}");
        assert_eq!(t.role, Role::Tool);
        assert_eq!(t.tool_call_id.as_deref(), Some("call-1"));
        assert_eq!(t.name.as_deref(), Some("LeadExtractor"));
    }

    /// **Scenario**: with_name tags the sender and keeps tool calls.
    #[test]
    fn with_name_keeps_tool_calls() {
        let m = Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("c1", "search", serde_json::json!({"q": "x"}))],
        )
        .with_name("lead_finder");
        assert_eq!(m.name.as_deref(), Some("lead_finder"));
        assert!(m.has_tool_calls());
    }

    /// **Scenario**: Empty optional fields are omitted from JSON; role is lower-case.
    #[test]
    fn serialize_omits_empty_fields() {
        let js = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(js["role"], "user");
        assert!(js.get("tool_calls").is_none());
        assert!(js.get("name").is_none());
    }
}

//! Conversation state threaded through the lead-generation graph.
//!
//! [`ConversationState`] is the single state type of the graph: every node receives it by
//! value and returns the next value. History is append-only; the only way to add to it is
//! [`ConversationState::with_message`], which consumes the state and returns a new one,
//! so a clone held by another reader never observes the change.

use serde::{Deserialize, Serialize};

use crate::message::{Message, Role};

/// Append-only message log plus the name of the agent that produced the last agent message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    #[serde(default)]
    sender: Option<String>,
}

impl ConversationState {
    /// Seeds a run with the operator's requirement as the only (user) message.
    pub fn new(requirement: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(requirement)],
            sender: None,
        }
    }

    /// Builds a state from existing messages (e.g. in tests or when resuming a transcript).
    pub fn from_messages(messages: Vec<Message>, sender: Option<String>) -> Self {
        Self { messages, sender }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Agent that most recently ran (set by agent nodes, left unchanged by tool execution).
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Returns the state with `message` appended.
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Returns the state with `sender` set to `name`.
    pub fn with_sender(self, name: impl Into<String>) -> Self {
        Self {
            sender: Some(name.into()),
            ..self
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Content of the chronologically last assistant message, if any.
    pub fn last_assistant_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// Assistant messages produced by the agent `name`, oldest first.
    pub fn replies_from<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Message> + 'a {
        self.messages
            .iter()
            .filter(move |m| m.role == Role::Assistant && m.name.as_deref() == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: new() seeds exactly one user message and no sender.
    #[test]
    fn new_seeds_single_user_message() {
        let state = ConversationState::new("find pet-food buyers in India");
        assert_eq!(state.len(), 1);
        assert!(state.last_message().unwrap().is_user());
        assert_eq!(state.sender(), None);
    }

    /// **Scenario**: Appending to a moved state does not affect an earlier clone.
    #[test]
    fn with_message_leaves_prior_clone_untouched() {
        let before = ConversationState::new("req");
        let after = before.clone().with_message(Message::assistant("done"));
        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
    }

    /// **Scenario**: last_assistant_reply skips trailing tool messages.
    #[test]
    fn last_assistant_reply_skips_tool_messages() {
        let state = ConversationState::new("req")
            .with_message(Message::assistant("answer").with_name("a"))
            .with_message(Message::tool("c1", "t", "{}"))
            .with_sender("a");
        assert_eq!(state.last_assistant_reply(), Some("answer"));
        assert_eq!(state.replies_from("a").count(), 1);
        assert_eq!(state.sender(), Some("a"));
    }
}

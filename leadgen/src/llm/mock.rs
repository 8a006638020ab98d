//! Mock completion service for tests and offline runs.
//!
//! Replies come from a script, one per call, in order; once the script is exhausted
//! the fallback reply is repeated. Every request is recorded so tests can assert on
//! the history, tool specs and system instruction an agent sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::CompletionError;
use crate::llm::CompletionService;
use crate::message::{Message, ToolCall};
use crate::tools::ToolSpec;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Plain assistant text, no tool calls.
    Text(String),
    /// Assistant message requesting the given tool calls.
    ToolCalls { content: String, calls: Vec<ToolCall> },
    /// The call fails with this error.
    Error(CompletionError),
}

impl MockReply {
    fn into_result(self) -> Result<Message, CompletionError> {
        match self {
            Self::Text(content) => Ok(Message::assistant(content)),
            Self::ToolCalls { content, calls } => {
                Ok(Message::assistant_with_tool_calls(content, calls))
            }
            Self::Error(err) => Err(err),
        }
    }
}

/// What one `complete` call received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub history: Vec<Message>,
    pub tool_names: Vec<String>,
    pub system_instruction: String,
}

/// Scripted completion service.
///
/// ```rust,ignore
/// let llm = MockLlm::first_tools_then_text(
///     vec![ToolCall::new("call-1", "LeadFinderTool", json!({"query": "pet food"}))],
///     "Acme Pet Foods",
/// );
/// ```
pub struct MockLlm {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockLlm {
    /// Replies with `script` in order, then repeats `"done"`.
    pub fn new(script: Vec<MockReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: MockReply::Text("done".to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always replies with `content` and no tool calls.
    pub fn always_text(content: impl Into<String>) -> Self {
        Self::new(Vec::new()).with_fallback(MockReply::Text(content.into()))
    }

    /// First call requests `calls`; every later call replies with `content`.
    pub fn first_tools_then_text(calls: Vec<ToolCall>, content: impl Into<String>) -> Self {
        Self::new(vec![MockReply::ToolCalls {
            content: String::new(),
            calls,
        }])
        .with_fallback(MockReply::Text(content.into()))
    }

    /// Every call requests `calls` (drives endless tool loops).
    pub fn always_tools(calls: Vec<ToolCall>) -> Self {
        Self::new(Vec::new()).with_fallback(MockReply::ToolCalls {
            content: String::new(),
            calls,
        })
    }

    /// Every call fails with `err`.
    pub fn always_error(err: CompletionError) -> Self {
        Self::new(Vec::new()).with_fallback(MockReply::Error(err))
    }

    /// Replaces the reply used after the script runs out.
    pub fn with_fallback(self, fallback: MockReply) -> Self {
        Self { fallback, ..self }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of `complete` calls so far.
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

#[async_trait]
impl CompletionService for MockLlm {
    async fn complete(
        &self,
        history: &[Message],
        tools: &[ToolSpec],
        system_instruction: &str,
    ) -> Result<Message, CompletionError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                history: history.to_vec(),
                tool_names: tools.iter().map(|t| t.name.clone()).collect(),
                system_instruction: system_instruction.to_string(),
            });
        let reply = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        reply.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompletionErrorKind;

    /// **Scenario**: Script replies are consumed in order, then the fallback repeats.
    #[tokio::test]
    async fn script_then_fallback() {
        let llm = MockLlm::first_tools_then_text(
            vec![ToolCall::new("c1", "t", serde_json::json!({}))],
            "final",
        );
        let first = llm.complete(&[], &[], "").await.unwrap();
        assert!(first.has_tool_calls());
        let second = llm.complete(&[], &[], "").await.unwrap();
        assert_eq!(second.content, "final");
        let third = llm.complete(&[], &[], "").await.unwrap();
        assert_eq!(third.content, "final");
        assert_eq!(llm.call_count(), 3);
    }

    /// **Scenario**: Requests are recorded with history, tool names and instruction.
    #[tokio::test]
    async fn records_requests() {
        let llm = MockLlm::always_text("ok");
        let spec = ToolSpec::new("LeadExtractor", "fetch", serde_json::json!({}));
        llm.complete(&[Message::user("req")], &[spec], "be helpful")
            .await
            .unwrap();
        let reqs = llm.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].history.len(), 1);
        assert_eq!(reqs[0].tool_names, vec!["LeadExtractor".to_string()]);
        assert_eq!(reqs[0].system_instruction, "be helpful");
    }

    /// **Scenario**: Error replies surface as CompletionError.
    #[tokio::test]
    async fn error_reply() {
        let llm = MockLlm::always_error(CompletionError::new(CompletionErrorKind::Auth, "bad key"));
        let err = llm.complete(&[], &[], "").await.unwrap_err();
        assert_eq!(err.kind, CompletionErrorKind::Auth);
    }
}

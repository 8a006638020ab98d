//! Error types for tools, completion backends, and graph runs.
//!
//! Three layers, three types:
//!
//! - [`ToolError`]: a tool invocation failed. Caught by the tool-execution node and
//!   reported back into the conversation as a `tool` message; never aborts a run.
//! - [`CompletionError`]: the language-model backend failed. Propagates out of the
//!   agent step and aborts the run.
//! - [`AgentError`]: anything that stops a graph run (completion failure, step limit,
//!   cancellation, routing to an unknown node).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a tool failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolErrorKind {
    /// Arguments did not match the tool's declared input schema.
    Validation,
    /// The outbound call failed (transport error or unexpected HTTP status).
    Network,
    /// The remote response could not be parsed.
    Parse,
    /// The tool, the resource, or an expected field does not exist.
    NotFound,
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "VALIDATION",
            Self::Network => "NETWORK",
            Self::Parse => "PARSE",
            Self::NotFound => "NOT_FOUND",
        };
        f.write_str(s)
    }
}

/// Failure of a single tool invocation.
///
/// Serializes as `{"kind": "NETWORK", "detail": "..."}`; the tool-execution node wraps
/// that under an `error` key in the `tool` message it appends.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {detail}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub detail: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Validation, detail)
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Network, detail)
    }

    pub fn parse(detail: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Parse, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, detail)
    }

    /// Payload placed in the `tool` message content when the call failed.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({ "error": self })
    }
}

/// Category of a completion backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionErrorKind {
    /// Credentials rejected (HTTP 401/403).
    Auth,
    /// Backend asked us to slow down (HTTP 429).
    RateLimit,
    /// Request did not complete in time.
    Timeout,
    /// Response arrived but was not a usable completion.
    MalformedResponse,
    /// Backend unreachable or failed server-side (connect error, 5xx).
    Unavailable,
}

impl fmt::Display for CompletionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auth => "AUTH",
            Self::RateLimit => "RATE_LIMIT",
            Self::Timeout => "TIMEOUT",
            Self::MalformedResponse => "MALFORMED_RESPONSE",
            Self::Unavailable => "UNAVAILABLE",
        };
        f.write_str(s)
    }
}

/// Failure of a completion call. Never retried by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("completion failed ({kind}): {detail}")]
pub struct CompletionError {
    pub kind: CompletionErrorKind,
    pub detail: String,
}

impl CompletionError {
    pub fn new(kind: CompletionErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Error that stops a node or a whole graph run.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The agent's completion backend failed; the run is aborted.
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// The run executed more nodes than the configured limit.
    #[error("run exceeded the maximum of {0} steps")]
    MaxStepsExceeded(usize),

    /// The run was cancelled between two steps.
    #[error("run cancelled")]
    Cancelled,

    /// Routing produced a node id that the graph does not contain.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// Execution failed with a message.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

//! OpenAI-compatible Chat Completions client implementing `CompletionService` (ChatOpenAI).
//!
//! Talks to `{base_url}/chat/completions` with a bearer token. The same client serves
//! OpenAI (agent reasoning) and Perplexity (`sonar-pro`, search-grounded answers for
//! the lead finder); only base URL, key and model differ.
//!
//! Failures map onto [`CompletionErrorKind`]:
//!
//! | condition                                  | kind                 |
//! |--------------------------------------------|----------------------|
//! | HTTP 401 / 403                             | `Auth`               |
//! | HTTP 429                                   | `RateLimit`          |
//! | client timeout, HTTP 408 / 504             | `Timeout`            |
//! | body not a completion, empty `choices`     | `MalformedResponse`  |
//! | connect error, any other non-2xx status    | `Unavailable`        |

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::error::{CompletionError, CompletionErrorKind};
use crate::llm::CompletionService;
use crate::message::{Message, Role, ToolCall};
use crate::tools::ToolSpec;

/// Default OpenAI API root.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Perplexity API root (OpenAI-compatible).
pub const PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";

/// Longest slice of an error body kept in `CompletionError::detail`.
const ERROR_BODY_MAX: usize = 512;

/// OpenAI-compatible chat client.
#[derive(Clone)]
pub struct ChatOpenAI {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Option<Duration>,
}

impl ChatOpenAI {
    /// Client for the OpenAI API with the given key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: None,
        }
    }

    /// Client for Perplexity's search-grounded models (e.g. `sonar-pro`).
    pub fn perplexity(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(api_key, model).with_base_url(PERPLEXITY_BASE_URL)
    }

    /// Overrides the API root (e.g. a proxy or a local mock server).
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..self
        }
    }

    /// Uses a preconfigured reqwest client.
    pub fn with_client(self, client: reqwest::Client) -> Self {
        Self { client, ..self }
    }

    /// Per-request timeout; an elapsed timeout is reported as `Timeout`.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, history: &[Message], tools: &[ToolSpec], system: &str) -> Value {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if !system.is_empty() {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.extend(history.iter().map(wire_message));

        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(obj) = body.as_object_mut() {
            if !tools.is_empty() {
                let tools: Vec<Value> = tools
                    .iter()
                    .map(|t| {
                        json!({
                            "type": "function",
                            "function": {
                                "name": t.name,
                                "description": t.description.clone().unwrap_or_default(),
                                "parameters": t.input_schema,
                            }
                        })
                    })
                    .collect();
                obj.insert("tools".to_string(), Value::Array(tools));
            }
        }
        body
    }
}

/// Converts one conversation message to the OpenAI wire shape.
fn wire_message(m: &Message) -> Value {
    match m.role {
        Role::User => json!({ "role": "user", "content": m.content }),
        Role::Tool => json!({
            "role": "tool",
            "tool_call_id": m.tool_call_id.clone().unwrap_or_default(),
            "content": m.content,
        }),
        Role::Assistant => {
            let mut v = json!({ "role": "assistant", "content": m.content });
            if let Some(obj) = v.as_object_mut() {
                if let Some(ref name) = m.name {
                    obj.insert("name".to_string(), json!(name));
                }
                if m.has_tool_calls() {
                    if m.content.is_empty() {
                        obj.insert("content".to_string(), Value::Null);
                    }
                    let calls: Vec<Value> = m
                        .tool_calls
                        .iter()
                        .map(|c| {
                            json!({
                                "id": c.id,
                                "type": "function",
                                "function": { "name": c.name, "arguments": arguments_to_wire(&c.arguments) },
                            })
                        })
                        .collect();
                    obj.insert("tool_calls".to_string(), Value::Array(calls));
                }
            }
            v
        }
    }
}

/// Arguments go over the wire as a JSON string; a kept raw string is sent unchanged.
fn arguments_to_wire(args: &Value) -> String {
    match args {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// Parses the model's argument string; invalid JSON is kept as a string value.
fn arguments_from_wire(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn kind_for_status(status: u16) -> CompletionErrorKind {
    match status {
        401 | 403 => CompletionErrorKind::Auth,
        429 => CompletionErrorKind::RateLimit,
        408 | 504 => CompletionErrorKind::Timeout,
        _ => CompletionErrorKind::Unavailable,
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Deserialize)]
struct ResponseToolCall {
    #[serde(default)]
    id: Option<String>,
    function: ResponseFunction,
}

#[derive(Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn parse_completion(body: &str) -> Result<Message, CompletionError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        CompletionError::new(
            CompletionErrorKind::MalformedResponse,
            format!("invalid completion body: {}", e),
        )
    })?;
    let choice = parsed.choices.into_iter().next().ok_or_else(|| {
        CompletionError::new(CompletionErrorKind::MalformedResponse, "no choices in response")
    })?;
    let content = choice.message.content.unwrap_or_default();
    let calls: Vec<ToolCall> = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|c| {
            let id = c
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));
            ToolCall::new(id, c.function.name, arguments_from_wire(&c.function.arguments))
        })
        .collect();
    Ok(Message::assistant_with_tool_calls(content, calls))
}

#[async_trait]
impl CompletionService for ChatOpenAI {
    async fn complete(
        &self,
        history: &[Message],
        tools: &[ToolSpec],
        system_instruction: &str,
    ) -> Result<Message, CompletionError> {
        let url = self.chat_completions_url();
        let body = self.request_body(history, tools, system_instruction);
        debug!(model = %self.model, url = %url, messages = history.len(), tools = tools.len(), "chat completion request");
        trace!(body = %body, "chat completion request body");

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            let kind = if e.is_timeout() {
                CompletionErrorKind::Timeout
            } else {
                CompletionErrorKind::Unavailable
            };
            CompletionError::new(kind, e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            let kind = if e.is_timeout() {
                CompletionErrorKind::Timeout
            } else {
                CompletionErrorKind::MalformedResponse
            };
            CompletionError::new(kind, e.to_string())
        })?;
        trace!(status = status.as_u16(), body = %text, "chat completion response");

        if !status.is_success() {
            return Err(CompletionError::new(
                kind_for_status(status.as_u16()),
                format!("HTTP {}: {}", status, truncate(&text, ERROR_BODY_MAX)),
            ));
        }
        parse_completion(&text)
    }
}

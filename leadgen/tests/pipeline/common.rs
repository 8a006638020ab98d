//! Shared stubs for pipeline integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use leadgen::{
    AgentSpec, CompletionService, MockLlm, Orchestrator, Tool, ToolCall, ToolError, ToolRegistry,
    ToolSpec,
};
use serde_json::{json, Value};

/// Tool that returns its arguments wrapped under `echo`.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn spec(&self) -> ToolSpec {
        ToolSpec::new("echo", "Echoes its arguments", json!({"type": "object"}))
    }
    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        Ok(json!({ "echo": args }))
    }
}

/// Tool that always fails with a network error.
pub struct OfflineTool;

#[async_trait]
impl Tool for OfflineTool {
    fn name(&self) -> &str {
        "offline"
    }
    fn spec(&self) -> ToolSpec {
        ToolSpec::new("offline", "Always unreachable", json!({"type": "object"}))
    }
    async fn call(&self, _args: Value) -> Result<Value, ToolError> {
        Err(ToolError::network("connection refused"))
    }
}

pub fn registry() -> ToolRegistry {
    ToolRegistry::new()
        .with_tool(Arc::new(EchoTool))
        .with_tool(Arc::new(OfflineTool))
}

pub fn call(id: &str, tool: &str) -> ToolCall {
    ToolCall::new(id, tool, json!({ "id": id }))
}

pub fn agent(name: &str, llm: Arc<MockLlm>, tools: &[&str]) -> AgentSpec {
    let llm: Arc<dyn CompletionService> = llm;
    AgentSpec::new(name, format!("You are {}.", name), llm).with_tools(tools.iter().copied())
}

/// Two agents `a` and `b`, both bound to `echo` and `offline`.
pub fn two_agents(a: Arc<MockLlm>, b: Arc<MockLlm>) -> Orchestrator {
    Orchestrator::new(
        vec![
            agent("a", a, &["echo", "offline"]),
            agent("b", b, &["echo", "offline"]),
        ],
        registry(),
    )
    .expect("pipeline builds")
}

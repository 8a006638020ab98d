//! Step limit, cancellation and completion failures.

use std::sync::Arc;

use async_trait::async_trait;
use leadgen::{
    AgentError, AgentSpec, CompletionError, CompletionErrorKind, MockLlm, Orchestrator, RunConfig,
    Tool, ToolError, ToolRegistry, ToolSpec,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::common::{call, two_agents};

/// **Scenario**: An agent that requests tools forever is stopped by the step limit.
#[tokio::test]
async fn endless_tool_loop_hits_max_steps() {
    let a = Arc::new(MockLlm::always_tools(vec![call("c", "echo")]));
    let b = Arc::new(MockLlm::always_text("never"));
    let pipeline = two_agents(a.clone(), b.clone());

    let result = pipeline
        .run_with_config("req", RunConfig::default().with_max_steps(6))
        .await;

    match result {
        Err(AgentError::MaxStepsExceeded(n)) => assert_eq!(n, 6),
        other => panic!("expected MaxStepsExceeded, got {:?}", other.map(|s| s.len())),
    }
    // a, call_tool, a, call_tool, a, call_tool
    assert_eq!(a.call_count(), 3);
    assert_eq!(b.call_count(), 0);
}

/// **Scenario**: The default step limit also bounds the loop.
#[tokio::test]
async fn default_limit_applies() {
    let a = Arc::new(MockLlm::always_tools(vec![call("c", "echo")]));
    let pipeline = two_agents(a, Arc::new(MockLlm::always_text("b")));
    let result = pipeline.run("req").await;
    assert!(matches!(
        result,
        Err(AgentError::MaxStepsExceeded(n)) if n == leadgen::DEFAULT_MAX_STEPS
    ));
}

/// **Scenario**: A token cancelled before the run starts means no completion call at all.
#[tokio::test]
async fn cancelled_before_start() {
    let a = Arc::new(MockLlm::always_text("a"));
    let pipeline = two_agents(a.clone(), Arc::new(MockLlm::always_text("b")));
    let token = CancellationToken::new();
    token.cancel();

    let result = pipeline
        .run_with_config("req", RunConfig::default().with_cancellation(token))
        .await;

    assert!(matches!(result, Err(AgentError::Cancelled)));
    assert_eq!(a.call_count(), 0);
}

/// Tool that cancels the run's token when called.
struct CancellingTool(CancellationToken);

#[async_trait]
impl Tool for CancellingTool {
    fn name(&self) -> &str {
        "stop"
    }
    fn spec(&self) -> ToolSpec {
        ToolSpec::new("stop", "Cancels the run", json!({"type": "object"}))
    }
    async fn call(&self, _args: Value) -> Result<Value, ToolError> {
        self.0.cancel();
        Ok(json!("stopping"))
    }
}

/// **Scenario**: Cancellation during a step takes effect before the next step.
#[tokio::test]
async fn cancelled_mid_run() {
    let token = CancellationToken::new();
    let llm = Arc::new(MockLlm::first_tools_then_text(vec![call("c1", "stop")], "after"));
    let pipeline = Orchestrator::new(
        vec![AgentSpec::new("a", "", llm.clone()).with_tools(["stop"])],
        ToolRegistry::new().with_tool(Arc::new(CancellingTool(token.clone()))),
    )
    .unwrap();

    let result = pipeline
        .run_with_config("req", RunConfig::default().with_cancellation(token))
        .await;

    assert!(matches!(result, Err(AgentError::Cancelled)));
    assert_eq!(llm.call_count(), 1);
}

/// **Scenario**: A completion failure aborts the run with the same kind.
#[tokio::test]
async fn completion_error_aborts_run() {
    let a = Arc::new(MockLlm::always_text("a"));
    let b = Arc::new(MockLlm::always_error(CompletionError::new(
        CompletionErrorKind::RateLimit,
        "slow down",
    )));
    let pipeline = two_agents(a.clone(), b);

    match pipeline.run("req").await {
        Err(AgentError::Completion(err)) => {
            assert_eq!(err.kind, CompletionErrorKind::RateLimit);
            assert_eq!(err.detail, "slow down");
        }
        other => panic!("expected completion error, got {:?}", other.map(|s| s.len())),
    }
    assert_eq!(a.call_count(), 1);
}

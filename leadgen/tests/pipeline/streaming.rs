//! `Orchestrator::stream` and middleware over a full pipeline.

use std::sync::Arc;

use leadgen::{
    AgentSpec, ConversationState, LoggingNodeMiddleware, MockLlm, NodeMiddleware, Orchestrator,
    StreamEvent, TOOL_NODE,
};
use tokio_stream::StreamExt;

use crate::common::{agent, call, registry, two_agents};

/// **Scenario**: One Updates per node visit, in visit order, then End with the final state.
#[tokio::test]
async fn stream_reports_visits_in_order() {
    let a = Arc::new(MockLlm::first_tools_then_text(vec![call("c1", "echo")], "a"));
    let pipeline = two_agents(a, Arc::new(MockLlm::always_text("b")));

    let events: Vec<_> = pipeline.stream("req", None).collect().await;

    let visited: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Updates { node_id, .. } => Some(node_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(visited, vec!["a", TOOL_NODE, "a", "b"]);

    match events.last() {
        Some(StreamEvent::End(state)) => {
            assert_eq!(state.sender(), Some("b"));
            assert_eq!(pipeline.final_answer(state), Some("b"));
        }
        other => panic!("expected End, got {:?}", other.map(|e| e.is_terminal())),
    }
    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
}

/// **Scenario**: A failing run streams its partial updates and then a single Error.
#[tokio::test]
async fn stream_ends_with_error_on_completion_failure() {
    let b = Arc::new(MockLlm::always_error(leadgen::CompletionError::new(
        leadgen::CompletionErrorKind::Unavailable,
        "down",
    )));
    let pipeline = two_agents(Arc::new(MockLlm::always_text("a")), b);

    let events: Vec<_> = pipeline.stream("req", None).collect().await;
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], StreamEvent::Updates { node_id, .. } if node_id == "a"));
    assert!(matches!(&events[1], StreamEvent::Error(msg) if msg.contains("down")));
}

/// **Scenario**: Logging middleware does not change the outcome.
#[tokio::test]
async fn logging_middleware_same_result() {
    let middleware: Arc<dyn NodeMiddleware<ConversationState>> =
        Arc::new(LoggingNodeMiddleware::<ConversationState>::default());
    let agents = |llm: Arc<MockLlm>| -> Vec<AgentSpec> {
        vec![agent("a", llm, &["echo"]), agent("b", Arc::new(MockLlm::always_text("b")), &[])]
    };
    let plain = Orchestrator::new(
        agents(Arc::new(MockLlm::first_tools_then_text(vec![call("c1", "echo")], "a"))),
        registry(),
    )
    .unwrap();
    let wrapped = Orchestrator::with_middleware(
        agents(Arc::new(MockLlm::first_tools_then_text(vec![call("c1", "echo")], "a"))),
        registry(),
        middleware,
    )
    .unwrap();

    let s1 = plain.run("req").await.unwrap();
    let s2 = wrapped.run("req").await.unwrap();
    assert_eq!(s1.messages(), s2.messages());
}

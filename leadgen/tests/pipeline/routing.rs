//! Agent order, tool round-trips and tool failures.

use std::sync::Arc;

use leadgen::{MockLlm, MockReply, Role};
use serde_json::Value;

use crate::common::{agent, call, registry, two_agents};

/// **Scenario**: Plain-text agents each run once, in order, and the run ends.
#[tokio::test]
async fn plain_text_agents_run_in_order() {
    let a = Arc::new(MockLlm::always_text("from a"));
    let b = Arc::new(MockLlm::always_text("from b"));
    let pipeline = two_agents(a.clone(), b.clone());

    let state = pipeline.run("find buyers").await.unwrap();

    let replies: Vec<_> = state
        .messages()
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.name.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(replies, vec!["a", "b"]);
    assert_eq!(state.sender(), Some("b"));
    assert_eq!(pipeline.final_answer(&state), Some("from b"));
    assert_eq!(a.call_count(), 1);
    assert_eq!(b.call_count(), 1);
}

/// **Scenario**: A tool request goes to call_tool and back to the same agent, then onward.
#[tokio::test]
async fn tool_round_trip_returns_to_requesting_agent() {
    let a = Arc::new(MockLlm::first_tools_then_text(vec![call("c1", "echo")], "a done"));
    let b = Arc::new(MockLlm::always_text("b done"));
    let pipeline = two_agents(a.clone(), b.clone());

    let state = pipeline.run("req").await.unwrap();
    let msgs = state.messages();

    // user, a(tool call), tool, nudge, a(text), nudge, b(text)
    assert_eq!(msgs.len(), 7);
    assert!(msgs[1].has_tool_calls());
    assert_eq!(msgs[2].role, Role::Tool);
    assert_eq!(msgs[2].tool_call_id.as_deref(), Some("c1"));
    assert_eq!(msgs[4].name.as_deref(), Some("a"));
    assert_eq!(msgs[4].content, "a done");
    assert_eq!(msgs[6].name.as_deref(), Some("b"));
    assert_eq!(a.call_count(), 2);
    assert_eq!(b.call_count(), 1);

    // The second call of `a` saw the tool result.
    let second = &a.requests()[1];
    assert!(second.history.iter().any(|m| m.role == Role::Tool));
}

/// **Scenario**: Two pending calls produce two tool messages in request order.
#[tokio::test]
async fn two_calls_answered_in_order() {
    let a = Arc::new(MockLlm::first_tools_then_text(
        vec![call("first", "echo"), call("second", "echo")],
        "done",
    ));
    let pipeline = two_agents(a, Arc::new(MockLlm::always_text("b")));

    let state = pipeline.run("req").await.unwrap();
    let ids: Vec<_> = state
        .messages()
        .iter()
        .filter(|m| m.role == Role::Tool)
        .map(|m| m.tool_call_id.clone().unwrap_or_default())
        .collect();
    assert_eq!(ids, vec!["first", "second"]);
}

/// **Scenario**: A NETWORK tool failure is appended as a payload and the run continues.
#[tokio::test]
async fn tool_failure_becomes_message() {
    let a = Arc::new(MockLlm::first_tools_then_text(vec![call("c1", "offline")], "recovered"));
    let pipeline = two_agents(a, Arc::new(MockLlm::always_text("b")));

    let state = pipeline.run("req").await.unwrap();
    let tool_msg = state
        .messages()
        .iter()
        .find(|m| m.role == Role::Tool)
        .expect("tool message");
    let payload: Value = serde_json::from_str(&tool_msg.content).unwrap();
    assert_eq!(payload["error"]["kind"], "NETWORK");
    assert_eq!(payload["error"]["detail"], "connection refused");
    assert_eq!(state.replies_from("a").last().unwrap().content, "recovered");
    assert_eq!(pipeline.final_answer(&state), Some("b"));
}

/// **Scenario**: A request for a tool bound only to another agent is NOT_FOUND.
#[tokio::test]
async fn unbound_tool_request_is_not_found() {
    let a = Arc::new(MockLlm::first_tools_then_text(vec![call("c1", "offline")], "ok"));
    let pipeline = leadgen::Orchestrator::new(
        vec![
            agent("a", a, &["echo"]),
            agent("b", Arc::new(MockLlm::always_text("b")), &["offline"]),
        ],
        registry(),
    )
    .unwrap();

    let state = pipeline.run("req").await.unwrap();
    let tool_msg = state
        .messages()
        .iter()
        .find(|m| m.role == Role::Tool)
        .unwrap();
    let payload: Value = serde_json::from_str(&tool_msg.content).unwrap();
    assert_eq!(payload["error"]["kind"], "NOT_FOUND");
}

/// **Scenario**: The second agent may also use tools; control returns to it, not the first.
#[tokio::test]
async fn second_agent_tool_round_trip() {
    let a = Arc::new(MockLlm::always_text("list"));
    let b = Arc::new(MockLlm::new(vec![
        MockReply::ToolCalls {
            content: String::new(),
            calls: vec![call("c9", "echo")],
        },
        MockReply::Text("enriched".into()),
    ]));
    let pipeline = two_agents(a.clone(), b.clone());

    let state = pipeline.run("req").await.unwrap();
    assert_eq!(a.call_count(), 1);
    assert_eq!(b.call_count(), 2);
    assert_eq!(pipeline.final_answer(&state), Some("enriched"));
}

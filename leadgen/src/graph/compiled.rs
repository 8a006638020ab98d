//! Compiled state graph: immutable, supports invoke and stream.
//!
//! Built by `StateGraph::compile`. Holds nodes, the routing table and the linear edge
//! order (derived from explicit edges at compile time). Every run is bounded by
//! `RunConfig::max_steps` and checks `RunConfig::cancellation` before each step.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AgentError;
use crate::stream::StreamEvent;

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_routing,
};
use super::node_middleware::NodeMiddleware;
use super::run_config::RunConfig;
use super::state_graph::END;
use super::{Next, NextEntry, Node};

/// Compiled graph: immutable structure, cheap to clone (nodes are shared).
///
/// Runs from the node after START; uses each node's conditional router (when present) or
/// its returned `Next` to choose the next node, until END.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// First node to run (target of the START edge).
    pub(super) first_node_id: String,
    /// Linear order of nodes (used for `Next::Continue` without an explicit edge).
    /// Holds only the first node when the graph has conditional edges.
    pub(super) edge_order: Vec<String>,
    /// Node id -> how to get the next node.
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Id of the node that runs first.
    pub fn first_node_id(&self) -> &str {
        &self.first_node_id
    }

    /// True if the graph contains a node with this id.
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    async fn execute_node(
        &self,
        node_id: &str,
        node: Arc<dyn Node<S>>,
        state: S,
    ) -> Result<(S, Next), AgentError> {
        match &self.middleware {
            Some(middleware) => {
                middleware
                    .around_run(
                        node_id,
                        state,
                        Box::new(move |s| Box::pin(async move { node.run(s).await })),
                    )
                    .await
            }
            None => node.run(state).await,
        }
    }

    fn resolve_next(&self, current_id: &str, state: &S, next: Next) -> Option<String> {
        match self.next_map.get(current_id) {
            Some(NextEntry::Conditional(router)) => {
                let target = router.resolve_next(state);
                log_routing(current_id, &target);
                Some(target)
            }
            entry => match next {
                Next::End => None,
                Next::Node(id) => Some(id),
                Next::Continue => match entry {
                    Some(NextEntry::Unconditional(id)) => Some(id.clone()),
                    _ => {
                        let pos = self.edge_order.iter().position(|x| x == current_id)?;
                        self.edge_order.get(pos + 1).cloned()
                    }
                },
            },
        }
    }

    /// Shared run loop used by invoke() and stream(): steps through nodes until END.
    ///
    /// When `events` is set, an `Updates` event is sent after every node.
    async fn run_loop(
        &self,
        state: S,
        config: &RunConfig,
        events: Option<&mpsc::Sender<StreamEvent<S>>>,
    ) -> Result<S, AgentError> {
        log_graph_start();
        let mut state = state;
        let mut current_id = self.first_node_id.clone();
        let mut steps = 0usize;

        loop {
            if config.cancellation.is_cancelled() {
                let err = AgentError::Cancelled;
                log_graph_error(&err);
                return Err(err);
            }
            if steps >= config.max_steps {
                let err = AgentError::MaxStepsExceeded(config.max_steps);
                log_graph_error(&err);
                return Err(err);
            }
            let node = match self.nodes.get(&current_id) {
                Some(node) => node.clone(),
                None => {
                    let err = AgentError::UnknownNode(current_id);
                    log_graph_error(&err);
                    return Err(err);
                }
            };
            steps += 1;
            log_node_start(&current_id, steps);
            log_node_state(&current_id, &state);

            let (new_state, next) = match self.execute_node(&current_id, node, state).await {
                Ok(output) => output,
                Err(err) => {
                    log_graph_error(&err);
                    return Err(err);
                }
            };
            log_node_complete(&current_id, &next);
            state = new_state;

            if let Some(tx) = events {
                let _ = tx
                    .send(StreamEvent::Updates {
                        node_id: current_id.clone(),
                        state: state.clone(),
                    })
                    .await;
            }

            match self.resolve_next(&current_id, &state, next) {
                Some(id) if id != END => current_id = id,
                _ => {
                    log_graph_complete(steps);
                    return Ok(state);
                }
            }
        }
    }

    /// Runs the graph with the given state and returns the final state.
    ///
    /// - `Next::Continue`: follow the node's edge, or the linear order; end if last.
    /// - `Next::Node(id)`: run the node with that id next.
    /// - `Next::End`: stop and return current state.
    ///
    /// Nodes with conditional edges are routed by their router instead.
    /// `config` defaults to [`RunConfig::default`].
    pub async fn invoke(&self, state: S, config: Option<RunConfig>) -> Result<S, AgentError> {
        if self.nodes.is_empty() {
            return Err(AgentError::ExecutionFailed("empty graph".into()));
        }
        let config = config.unwrap_or_default();
        self.run_loop(state, &config, None).await
    }

    /// Streams graph execution: one `Updates` per node, then `End` or `Error`.
    ///
    /// The run happens on a spawned task; dropping the stream does not stop it, cancel
    /// through `RunConfig::cancellation` instead.
    pub fn stream(&self, state: S, config: Option<RunConfig>) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let config = config.unwrap_or_default();

        tokio::spawn(async move {
            let terminal = if graph.nodes.is_empty() {
                StreamEvent::Error(AgentError::ExecutionFailed("empty graph".into()).to_string())
            } else {
                match graph.run_loop(state, &config, Some(&tx)).await {
                    Ok(final_state) => StreamEvent::End(final_state),
                    Err(err) => StreamEvent::Error(err.to_string()),
                }
            };
            let _ = tx.send(terminal).await;
        });

        ReceiverStream::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio_stream::StreamExt;
    use tokio_util::sync::CancellationToken;

    use crate::error::AgentError;
    use crate::graph::{
        LoggingNodeMiddleware, Next, Node, RunConfig, StateGraph, END, START,
    };
    use crate::stream::StreamEvent;

    struct AddNode {
        id: &'static str,
        delta: i32,
    }

    #[async_trait]
    impl Node<i32> for AddNode {
        fn id(&self) -> &str {
            self.id
        }
        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            Ok((state + self.delta, Next::Continue))
        }
    }

    struct JumpNode;

    #[async_trait]
    impl Node<i32> for JumpNode {
        fn id(&self) -> &str {
            "first"
        }
        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            Ok((state + 1, Next::Node("third".to_string())))
        }
    }

    struct FailNode;

    #[async_trait]
    impl Node<i32> for FailNode {
        fn id(&self) -> &str {
            "fail"
        }
        async fn run(&self, _state: i32) -> Result<(i32, Next), AgentError> {
            Err(AgentError::ExecutionFailed("boom".into()))
        }
    }

    /// Node that counts how often it runs.
    struct CountingNode {
        id: &'static str,
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Node<i32> for CountingNode {
        fn id(&self) -> &str {
            self.id
        }
        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok((state + 1, Next::Continue))
        }
    }

    fn add(id: &'static str, delta: i32) -> Arc<dyn Node<i32>> {
        Arc::new(AddNode { id, delta })
    }

    fn two_step_graph() -> crate::graph::CompiledStateGraph<i32> {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", add("a", 1));
        graph.add_node("b", add("b", 2));
        graph.add_edge(START, "a");
        graph.add_edge("a", "b");
        graph.add_edge("b", END);
        graph.compile().expect("graph compiles")
    }

    /// Graph that loops `a -> a` while state < limit, then ends.
    fn looping_graph(runs: Arc<AtomicUsize>, limit: i32) -> crate::graph::CompiledStateGraph<i32> {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", Arc::new(CountingNode { id: "a", runs }));
        graph.add_edge(START, "a");
        graph.add_conditional_edges(
            "a",
            Arc::new(move |s: &i32| if *s < limit { "a".into() } else { END.into() }),
            None,
        );
        graph.compile().expect("graph compiles")
    }

    /// **Scenario**: Linear graph runs every node once, in order.
    #[tokio::test]
    async fn invoke_linear_graph_runs_all_nodes() {
        let out = two_step_graph().invoke(0, None).await.unwrap();
        assert_eq!(out, 3);
    }

    /// **Scenario**: Conditional edges pick the next node from state.
    #[tokio::test]
    async fn invoke_conditional_edges_routes_by_state() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("decide", add("decide", 0));
        graph.add_node("even_node", add("even_node", 10));
        graph.add_node("odd_node", add("odd_node", 100));
        graph.add_edge(START, "decide");
        graph.add_edge("even_node", END);
        graph.add_edge("odd_node", END);
        let path_map: HashMap<String, String> = [
            ("even".to_string(), "even_node".to_string()),
            ("odd".to_string(), "odd_node".to_string()),
        ]
        .into_iter()
        .collect();
        graph.add_conditional_edges(
            "decide",
            Arc::new(|s: &i32| if s % 2 == 0 { "even".into() } else { "odd".into() }),
            Some(path_map),
        );
        let compiled = graph.compile().expect("graph compiles");
        assert_eq!(compiled.invoke(2, None).await.unwrap(), 12);
        assert_eq!(compiled.invoke(1, None).await.unwrap(), 101);
    }

    /// **Scenario**: Next::Node(id) jumps over the linear successor.
    #[tokio::test]
    async fn invoke_next_node_jumps_to_specified_node() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("first", Arc::new(JumpNode));
        graph.add_node("second", add("second", 10));
        graph.add_node("third", add("third", 100));
        graph.add_edge(START, "first");
        graph.add_edge("first", "second");
        graph.add_edge("second", "third");
        graph.add_edge("third", END);
        let out = graph.compile().unwrap().invoke(0, None).await.unwrap();
        assert_eq!(out, 101);
    }

    /// **Scenario**: A self-loop stops with MaxStepsExceeded after exactly max_steps runs.
    #[tokio::test]
    async fn invoke_stops_at_max_steps() {
        let runs = Arc::new(AtomicUsize::new(0));
        let compiled = looping_graph(runs.clone(), i32::MAX);
        let result = compiled
            .invoke(0, Some(RunConfig::default().with_max_steps(5)))
            .await;
        match result {
            Err(AgentError::MaxStepsExceeded(n)) => assert_eq!(n, 5),
            other => panic!("expected MaxStepsExceeded, got {:?}", other),
        }
        assert_eq!(runs.load(Ordering::SeqCst), 5);
    }

    /// **Scenario**: A run that ends within the limit is not affected by it.
    #[tokio::test]
    async fn invoke_within_max_steps_completes() {
        let runs = Arc::new(AtomicUsize::new(0));
        let compiled = looping_graph(runs.clone(), 3);
        let out = compiled
            .invoke(0, Some(RunConfig::default().with_max_steps(3)))
            .await
            .unwrap();
        assert_eq!(out, 3);
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    /// **Scenario**: A cancelled token stops the run before the first node.
    #[tokio::test]
    async fn invoke_cancelled_before_start_runs_nothing() {
        let runs = Arc::new(AtomicUsize::new(0));
        let compiled = looping_graph(runs.clone(), 10);
        let token = CancellationToken::new();
        token.cancel();
        let result = compiled
            .invoke(0, Some(RunConfig::default().with_cancellation(token)))
            .await;
        assert!(matches!(result, Err(AgentError::Cancelled)));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    /// **Scenario**: Routing to an id that is not a node fails with UnknownNode.
    #[tokio::test]
    async fn invoke_unknown_route_target_is_an_error() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", add("a", 1));
        graph.add_edge(START, "a");
        graph.add_conditional_edges("a", Arc::new(|_: &i32| "ghost".into()), None);
        let result = graph.compile().unwrap().invoke(0, None).await;
        match result {
            Err(AgentError::UnknownNode(id)) => assert_eq!(id, "ghost"),
            other => panic!("expected UnknownNode, got {:?}", other),
        }
    }

    /// **Scenario**: A node error aborts the run and is returned unchanged.
    #[tokio::test]
    async fn invoke_node_error_propagates() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("fail", Arc::new(FailNode));
        graph.add_edge(START, "fail");
        graph.add_edge("fail", END);
        let result = graph.compile().unwrap().invoke(0, None).await;
        assert!(matches!(result, Err(AgentError::ExecutionFailed(ref m)) if m == "boom"));
    }

    /// **Scenario**: Middleware wraps node runs without changing the result.
    #[tokio::test]
    async fn invoke_with_logging_middleware_same_result() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", add("a", 1));
        graph.add_node("b", add("b", 2));
        graph.add_edge(START, "a");
        graph.add_edge("a", "b");
        graph.add_edge("b", END);
        let compiled = graph
            .compile_with_middleware(Arc::new(LoggingNodeMiddleware::<i32>::default()))
            .unwrap();
        assert_eq!(compiled.invoke(0, None).await.unwrap(), 3);
    }

    /// **Scenario**: stream emits one Updates per node in order, then End with the final state.
    #[tokio::test]
    async fn stream_updates_then_end() {
        let events: Vec<_> = two_step_graph().stream(0, None).collect().await;
        assert_eq!(events.len(), 3);
        match &events[0] {
            StreamEvent::Updates { node_id, state } => {
                assert_eq!(node_id, "a");
                assert_eq!(*state, 1);
            }
            other => panic!("expected Updates, got {:?}", other),
        }
        match &events[1] {
            StreamEvent::Updates { node_id, state } => {
                assert_eq!(node_id, "b");
                assert_eq!(*state, 3);
            }
            other => panic!("expected Updates, got {:?}", other),
        }
        assert!(matches!(events[2], StreamEvent::End(3)));
    }

    /// **Scenario**: A failing stream ends with a single Error event.
    #[tokio::test]
    async fn stream_error_is_terminal() {
        let runs = Arc::new(AtomicUsize::new(0));
        let events: Vec<_> = looping_graph(runs, i32::MAX)
            .stream(0, Some(RunConfig::default().with_max_steps(2)))
            .collect()
            .await;
        assert_eq!(events.len(), 3);
        assert!(events.last().unwrap().is_terminal());
        match events.last().unwrap() {
            StreamEvent::Error(msg) => assert!(msg.contains('2'), "{}", msg),
            other => panic!("expected Error, got {:?}", other),
        }
    }
}

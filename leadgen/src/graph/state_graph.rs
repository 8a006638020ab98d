//! Builder for state graphs.
//!
//! Register nodes with `add_node`, wire them with `add_edge(from, to)` (using [`START`]
//! and [`END`]) or `add_conditional_edges`, then `compile`. A node has at most one way
//! out: one plain edge or one router.
//!
//! The lead-generation pipeline is built entirely from routers: each agent routes on
//! `"continue"` / `"call_tool"`, and the tool-execution node routes back to whichever
//! agent is recorded as `sender`. Nodes return the full next state, which replaces the
//! previous one.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
use crate::graph::node::Node;
use crate::graph::node_middleware::NodeMiddleware;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)`.
pub const END: &str = "__end__";

/// Mutable graph definition over state `S`; turn it into a runnable graph with `compile`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Plain edges `(from, to)`, in insertion order.
    edges: Vec<(String, String)>,
    /// Router per source node.
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
        }
    }

    /// Adds a node; id must be unique. Replaces if same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an edge from `from_id` to `to_id`.
    ///
    /// Use `START` for graph entry and `END` for graph exit. Both ids (except
    /// START/END) must be registered via `add_node` before `compile()`.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds conditional edges from `source`: after it runs, `path(state)` picks the next node.
    ///
    /// - When `path_map` is `None`, the return value of `path` is the next node id (or END).
    /// - When `path_map` is `Some(map)`, the return value is the key; next node is
    ///   `map[key]` if present, otherwise the key itself.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// graph.add_conditional_edges(
    ///     "lead_finder",
    ///     Arc::new(|s: &ConversationState| route(s).as_str().to_string()),
    ///     Some([("continue".into(), "lead_enricher".into()), ("call_tool".into(), "call_tool".into())]
    ///         .into_iter()
    ///         .collect()),
    /// );
    /// ```
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    /// Builds the executable graph after validating ids and the routing table.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(None)
    }

    /// Builds the executable graph with node middleware wrapping every node run.
    pub fn compile_with_middleware(
        self,
        middleware: Arc<dyn NodeMiddleware<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(Some(middleware))
    }

    fn compile_internal(
        self,
        middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.check_node_ids()?;
        let first = self.entry_node()?;
        self.check_reaches_end()?;
        let next_map = self.routing_table()?;
        let edge_order = if self.conditional_edges.is_empty() {
            linear_order(&first, &next_map)?
        } else {
            vec![first.clone()]
        };

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            first_node_id: first,
            edge_order,
            next_map,
            middleware,
        })
    }

    fn is_node_or(&self, id: &str, sentinel: &str) -> bool {
        id == sentinel || self.nodes.contains_key(id)
    }

    /// Every edge endpoint and conditional target names a registered node (or START/END).
    fn check_node_ids(&self) -> Result<(), CompilationError> {
        if let Some(id) = self.edges.iter().find_map(|(from, to)| {
            if !self.is_node_or(from, START) {
                Some(from)
            } else if !self.is_node_or(to, END) {
                Some(to)
            } else {
                None
            }
        }) {
            return Err(CompilationError::NodeNotFound(id.clone()));
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            let targets = router.path_map.iter().flat_map(|m| m.values());
            if let Some(bad) = targets.into_iter().find(|t| !self.is_node_or(t, END)) {
                return Err(CompilationError::InvalidConditionalPathMap(bad.clone()));
            }
        }
        Ok(())
    }

    /// The single node START points at.
    fn entry_node(&self) -> Result<String, CompilationError> {
        let mut targets = self
            .edges
            .iter()
            .filter(|(from, _)| from == START)
            .map(|(_, to)| to);
        match (targets.next(), targets.next()) {
            (None, _) => Err(CompilationError::MissingStart),
            (Some(first), None) => Ok(first.clone()),
            (Some(_), Some(_)) => Err(CompilationError::InvalidChain(
                "more than one edge from START".into(),
            )),
        }
    }

    /// Some edge, or some conditional route, can end the run. A router without a path
    /// map may return END at run time, so it counts.
    fn check_reaches_end(&self) -> Result<(), CompilationError> {
        let by_edge = self.edges.iter().any(|(_, to)| to == END);
        let by_router = self.conditional_edges.values().any(|r| match r.path_map {
            Some(ref map) => map.values().any(|t| t == END),
            None => true,
        });
        if by_edge || by_router {
            Ok(())
        } else {
            Err(CompilationError::MissingEnd)
        }
    }

    /// Next-node entry per source node; a node has one plain edge or one router.
    fn routing_table(&self) -> Result<HashMap<String, NextEntry<S>>, CompilationError> {
        let mut table: HashMap<String, NextEntry<S>> = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(from, _)| from != START) {
            if table
                .insert(from.clone(), NextEntry::Unconditional(to.clone()))
                .is_some()
            {
                return Err(CompilationError::InvalidChain(format!(
                    "node '{}' has more than one outgoing edge",
                    from
                )));
            }
        }
        for (source, router) in &self.conditional_edges {
            if table.contains_key(source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(
                    source.clone(),
                ));
            }
            table.insert(source.clone(), NextEntry::Conditional(router.clone()));
        }
        Ok(table)
    }
}

/// Node order of a graph made only of plain edges, starting at `first`; rejects cycles.
fn linear_order<S>(
    first: &str,
    table: &HashMap<String, NextEntry<S>>,
) -> Result<Vec<String>, CompilationError> {
    let mut order = vec![first.to_string()];
    let mut seen: HashSet<String> = order.iter().cloned().collect();
    let mut current = first.to_string();
    while let Some(NextEntry::Unconditional(next)) = table.get(&current) {
        if next == END {
            break;
        }
        if !seen.insert(next.clone()) {
            return Err(CompilationError::InvalidChain(format!(
                "cycle through '{}'",
                next
            )));
        }
        order.push(next.clone());
        current = next.clone();
    }
    Ok(order)
}

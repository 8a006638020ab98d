//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when edges reference unknown nodes or
//! the routing table is inconsistent.

use thiserror::Error;

/// Error when compiling a state graph (e.g. edge references unknown node, invalid chain).
#[derive(Debug, Error)]
pub enum CompilationError {
    /// A node id in an edge was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge has from_id == START.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// Neither an edge nor a conditional path leads to END.
    #[error("graph must have at least one path to END")]
    MissingEnd,

    /// Edges branch or cycle where only a linear chain is allowed.
    #[error("edges must form a single linear chain from START to END: {0}")]
    InvalidChain(String),

    /// A node has both an outgoing edge and conditional edges; it must have exactly one.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A value in a conditional path_map is not a valid node id or END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),
}

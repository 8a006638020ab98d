//! Logging utilities for graph execution.
//!
//! Structured `tracing` events for graph start/complete/error, node execution,
//! and routing decisions.

use std::fmt::Debug;

pub fn log_node_start(node_id: &str, step: usize) {
    tracing::debug!(node_id = node_id, step = step, "Starting node execution");
}

/// Logs the input state of a node (trace level; states can be large).
pub fn log_node_state<S: Debug>(node_id: &str, state: &S) {
    tracing::trace!(node_id = node_id, state = ?state, "Node execution: state");
}

pub fn log_node_complete(node_id: &str, next: &crate::graph::Next) {
    tracing::debug!(node_id = node_id, ?next, "Node execution complete");
}

pub fn log_routing(from: &str, to: &str) {
    tracing::debug!(from = %from, to = %to, "conditional routing");
}

pub fn log_graph_start() {
    tracing::info!("Starting graph execution");
}

pub fn log_graph_complete(steps: usize) {
    tracing::info!(steps = steps, "Graph execution complete");
}

pub fn log_graph_error(error: &crate::error::AgentError) {
    tracing::error!(%error, "Graph execution error");
}

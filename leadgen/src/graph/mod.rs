//! State graph: nodes, plain and conditional edges, compile and run.
//!
//! Build a [`StateGraph`], compile it into a [`CompiledStateGraph`], then
//! `invoke` or `stream` it with an initial state and an optional [`RunConfig`].

mod compile_error;
mod compiled;
mod conditional;
mod logging;
mod logging_middleware;
mod next;
mod node;
mod node_middleware;
mod run_config;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_routing,
};
pub use logging_middleware::LoggingNodeMiddleware;
pub use next::Next;
pub use node::Node;
pub use node_middleware::{NodeMiddleware, NodeRunFn};
pub use run_config::{RunConfig, DEFAULT_MAX_STEPS};
pub use state_graph::{StateGraph, END, START};

//! Integration tests for the orchestrator: routing, tool round-trips, guards, streaming.
//!
//! Tests are split into modules under `pipeline/`:
//! - `common`: stub tools and agent builders
//! - `routing`: agent order, tool round-trips, tool failures
//! - `guards`: step limit, cancellation, completion errors
//! - `streaming`: `Orchestrator::stream` events and middleware


#[path = "pipeline/common.rs"]
mod common;

#[path = "pipeline/routing.rs"]
mod routing;

#[path = "pipeline/guards.rs"]
mod guards;

#[path = "pipeline/streaming.rs"]
mod streaming;

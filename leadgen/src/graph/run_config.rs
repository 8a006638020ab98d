//! Per-run configuration: step limit and cooperative cancellation.

use tokio_util::sync::CancellationToken;

/// Default cap on node executions per run.
pub const DEFAULT_MAX_STEPS: usize = 25;

/// Configuration for one graph run.
///
/// `max_steps` bounds the number of node executions, so an agent that keeps requesting
/// tools cannot ping-pong with the tool-execution node forever. `cancellation` is checked
/// before every step; a cancelled token stops the run with `AgentError::Cancelled`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub max_steps: usize,
    pub cancellation: CancellationToken,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            cancellation: CancellationToken::new(),
        }
    }
}

impl RunConfig {
    pub fn with_max_steps(self, max_steps: usize) -> Self {
        Self { max_steps, ..self }
    }

    pub fn with_cancellation(self, cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            ..self
        }
    }
}

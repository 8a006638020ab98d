//! Enter/exit logging for agent and tool steps (`leadgen -v`).

use async_trait::async_trait;
use std::fmt::Debug;
use std::marker::PhantomData;

use crate::error::AgentError;
use crate::graph::Next;

use super::node_middleware::NodeRunFn;
use super::NodeMiddleware;

/// Logs each step at info level; a failed step is logged at warn.
pub struct LoggingNodeMiddleware<S> {
    _phantom: PhantomData<S>,
}

impl<S> Default for LoggingNodeMiddleware<S> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<S> NodeMiddleware<S> for LoggingNodeMiddleware<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeRunFn<S>,
    ) -> Result<(S, Next), AgentError> {
        tracing::info!(node = %node_id, "enter node");
        let result = inner(state).await;
        match &result {
            Ok((_, next)) => tracing::info!(node = %node_id, ?next, "exit node"),
            Err(e) => tracing::warn!(node = %node_id, error = %e, "exit node with error"),
        }
        result
    }
}

//! Middleware wrapped around every node run of a compiled graph.
//!
//! The orchestrator passes one to `compile_with_middleware`; the CLI uses
//! [`LoggingNodeMiddleware`](super::LoggingNodeMiddleware) for `--verbose`.

use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use crate::error::AgentError;

use super::Next;

/// Boxed continuation handed to middleware; calling it runs the wrapped node.
pub type NodeRunFn<S> = Box<
    dyn FnOnce(S) -> Pin<Box<dyn Future<Output = Result<(S, Next), AgentError>> + Send>> + Send,
>;

/// Wraps one node run. Implementations must call `inner` exactly once.
#[async_trait]
pub trait NodeMiddleware<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// `node_id` is an agent name or `call_tool`.
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeRunFn<S>,
    ) -> Result<(S, Next), AgentError>;
}

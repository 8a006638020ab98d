//! Streaming events for graph runs.
//!
//! `CompiledStateGraph::stream` emits one [`StreamEvent::Updates`] after every node with the
//! full state at that point, then exactly one terminal event: [`StreamEvent::End`] with the
//! final state or [`StreamEvent::Error`] with the failure.

/// One event of a streamed graph run.
#[derive(Debug, Clone)]
pub enum StreamEvent<S> {
    /// Node `node_id` finished; `state` is the state after its update.
    Updates { node_id: String, state: S },
    /// The run reached END.
    End(S),
    /// The run stopped with an error (display form of the `AgentError`).
    Error(String),
}

impl<S> StreamEvent<S> {
    /// True for `End` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End(_) | Self::Error(_))
    }
}

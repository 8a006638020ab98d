use std::fmt;
use std::sync::Arc;

use crate::llm::CompletionService;

/// Static description of one agent.
///
/// Immutable once handed to the orchestrator. `tools` are names in the
/// [`ToolRegistry`](crate::tools::ToolRegistry); the order is kept in the system prompt.
#[derive(Clone)]
pub struct AgentSpec {
    pub name: String,
    pub instruction: String,
    pub tools: Vec<String>,
    pub llm: Arc<dyn CompletionService>,
}

impl AgentSpec {
    pub fn new(
        name: impl Into<String>,
        instruction: impl Into<String>,
        llm: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
            tools: Vec::new(),
            llm,
        }
    }

    /// Binds tools by registry name.
    pub fn with_tools<I, T>(self, tools: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tools: tools.into_iter().map(Into::into).collect(),
            ..self
        }
    }
}

impl fmt::Debug for AgentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentSpec")
            .field("name", &self.name)
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

//! Orchestrator: wires agents and the shared tool node into a compiled graph and runs it.
//!
//! Transition table, evaluated after each node:
//!
//! | node        | route      | next                                   |
//! |-------------|------------|----------------------------------------|
//! | agent *i*   | `continue` | agent *i+1*, or END after the last one |
//! | agent *i*   | `call_tool`| `call_tool`                            |
//! | `call_tool` | -          | the agent named by `state.sender`      |

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tokio_stream::wrappers::ReceiverStream;

use crate::agent::{route, AgentNode, AgentSpec, Route, ToolExecNode, TOOL_NODE};
use crate::error::AgentError;
use crate::graph::{
    CompilationError, CompiledStateGraph, NodeMiddleware, RunConfig, StateGraph, END, START,
};
use crate::llm::CompletionService;
use crate::message::Role;
use crate::prompts::{LEAD_ENRICHER_INSTRUCTION, LEAD_FINDER_INSTRUCTION};
use crate::state::ConversationState;
use crate::stream::StreamEvent;
use crate::tools::{
    LeadExtractorTool, LeadFinderTool, ToolRegistry, ToolSpec, TOOL_LEAD_EXTRACTOR,
    TOOL_LEAD_FINDER,
};

/// Name of the agent that finds candidate companies.
pub const LEAD_FINDER_AGENT: &str = "lead_finder";

/// Name of the agent that enriches the found companies.
pub const LEAD_ENRICHER_AGENT: &str = "lead_enricher";

/// Invalid pipeline definition.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("pipeline needs at least one agent")]
    NoAgents,
    #[error("duplicate agent name: {0}")]
    DuplicateAgent(String),
    #[error("agent name is reserved: {0}")]
    ReservedName(String),
    #[error("agent '{agent}' binds unknown tool '{tool}'")]
    UnknownTool { agent: String, tool: String },
    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

/// Runs a fixed sequence of agents that share one tool-execution node.
///
/// Built once from explicit [`AgentSpec`]s and a [`ToolRegistry`]; cheap to clone and
/// safe to use for several independent runs.
#[derive(Clone)]
pub struct Orchestrator {
    graph: CompiledStateGraph<ConversationState>,
    agent_names: Vec<String>,
}

impl Orchestrator {
    /// Validates the agents and compiles the graph.
    pub fn new(agents: Vec<AgentSpec>, tools: ToolRegistry) -> Result<Self, BuildError> {
        Self::build(agents, tools, None)
    }

    /// Like [`new`](Self::new), with middleware wrapping every node run.
    pub fn with_middleware(
        agents: Vec<AgentSpec>,
        tools: ToolRegistry,
        middleware: Arc<dyn NodeMiddleware<ConversationState>>,
    ) -> Result<Self, BuildError> {
        Self::build(agents, tools, Some(middleware))
    }

    fn build(
        agents: Vec<AgentSpec>,
        tools: ToolRegistry,
        middleware: Option<Arc<dyn NodeMiddleware<ConversationState>>>,
    ) -> Result<Self, BuildError> {
        if agents.is_empty() {
            return Err(BuildError::NoAgents);
        }
        let mut seen = HashSet::new();
        for agent in &agents {
            if agent.name == TOOL_NODE || agent.name == START || agent.name == END {
                return Err(BuildError::ReservedName(agent.name.clone()));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(BuildError::DuplicateAgent(agent.name.clone()));
            }
            if let Some(tool) = agent.tools.iter().find(|t| !tools.contains(t)) {
                return Err(BuildError::UnknownTool {
                    agent: agent.name.clone(),
                    tool: tool.clone(),
                });
            }
        }

        let agent_names: Vec<String> = agents.iter().map(|a| a.name.clone()).collect();
        let bindings: HashMap<String, HashSet<String>> = agents
            .iter()
            .map(|a| (a.name.clone(), a.tools.iter().cloned().collect()))
            .collect();

        let mut graph = StateGraph::<ConversationState>::new();
        for (i, agent) in agents.iter().enumerate() {
            let specs: Vec<ToolSpec> = agent
                .tools
                .iter()
                .filter_map(|name| tools.get(name).map(|t| t.spec()))
                .collect();
            graph.add_node(agent.name.clone(), Arc::new(AgentNode::new(agent, specs)));

            let next = agent_names
                .get(i + 1)
                .cloned()
                .unwrap_or_else(|| END.to_string());
            let path_map: HashMap<String, String> = [
                (Route::Continue.as_str().to_string(), next),
                (Route::CallTool.as_str().to_string(), TOOL_NODE.to_string()),
            ]
            .into_iter()
            .collect();
            graph.add_conditional_edges(
                agent.name.clone(),
                Arc::new(|s: &ConversationState| route(s).as_str().to_string()),
                Some(path_map),
            );
        }

        graph.add_node(TOOL_NODE, Arc::new(ToolExecNode::new(tools, bindings)));
        // Resolved on every visit; an unknown sender fails the run with UnknownNode.
        graph.add_conditional_edges(
            TOOL_NODE,
            Arc::new(|s: &ConversationState| s.sender().unwrap_or_default().to_string()),
            None,
        );
        graph.add_edge(START, agent_names[0].clone());

        let graph = match middleware {
            Some(m) => graph.compile_with_middleware(m)?,
            None => graph.compile()?,
        };
        tracing::debug!(agents = ?agent_names, "pipeline compiled");
        Ok(Self { graph, agent_names })
    }

    /// Agent names in execution order.
    pub fn agent_names(&self) -> &[String] {
        &self.agent_names
    }

    /// Runs the pipeline on `requirement` with the default [`RunConfig`].
    pub async fn run(
        &self,
        requirement: impl Into<String>,
    ) -> Result<ConversationState, AgentError> {
        self.run_with_config(requirement, RunConfig::default()).await
    }

    /// Runs the pipeline with an explicit step limit and cancellation token.
    pub async fn run_with_config(
        &self,
        requirement: impl Into<String>,
        config: RunConfig,
    ) -> Result<ConversationState, AgentError> {
        self.graph
            .invoke(ConversationState::new(requirement), Some(config))
            .await
    }

    /// Streams the run: one `Updates` per node, then `End` or `Error`.
    pub fn stream(
        &self,
        requirement: impl Into<String>,
        config: Option<RunConfig>,
    ) -> ReceiverStream<StreamEvent<ConversationState>> {
        self.graph.stream(ConversationState::new(requirement), config)
    }

    /// Content of the last assistant message produced by the last agent.
    pub fn final_answer<'a>(&self, state: &'a ConversationState) -> Option<&'a str> {
        let last_agent = self.agent_names.last()?.as_str();
        state
            .messages()
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant && m.name.as_deref() == Some(last_agent))
            .map(|m| m.content.as_str())
    }
}

/// The standard two-agent pipeline: `lead_finder` (bound to `LeadFinderTool`) then
/// `lead_enricher` (bound to `LeadExtractor`), both reasoning with `llm`.
pub fn leadgen_pipeline(
    llm: Arc<dyn CompletionService>,
    finder: LeadFinderTool,
    extractor: LeadExtractorTool,
) -> Result<Orchestrator, BuildError> {
    leadgen_pipeline_with(llm, finder, extractor, None)
}

/// [`leadgen_pipeline`] with optional node middleware (e.g. `LoggingNodeMiddleware`).
pub fn leadgen_pipeline_with(
    llm: Arc<dyn CompletionService>,
    finder: LeadFinderTool,
    extractor: LeadExtractorTool,
    middleware: Option<Arc<dyn NodeMiddleware<ConversationState>>>,
) -> Result<Orchestrator, BuildError> {
    let tools = ToolRegistry::new()
        .with_tool(Arc::new(finder))
        .with_tool(Arc::new(extractor));
    let agents = vec![
        AgentSpec::new(LEAD_FINDER_AGENT, LEAD_FINDER_INSTRUCTION, llm.clone())
            .with_tools([TOOL_LEAD_FINDER]),
        AgentSpec::new(LEAD_ENRICHER_AGENT, LEAD_ENRICHER_INSTRUCTION, llm)
            .with_tools([TOOL_LEAD_EXTRACTOR]),
    ];
    Orchestrator::build(agents, tools, middleware)
}

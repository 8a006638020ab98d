//! # leadgen
//!
//! Multi-agent lead generation: given a free-text requirement (e.g. "pet-food companies in
//! India open to acquisitions"), a `lead_finder` agent searches for candidate acquirers and a
//! `lead_enricher` agent enriches them from their websites. Agents share one tool-execution
//! node; control returns to whichever agent requested the tools.
//!
//! ## Design principles
//!
//! - **Single state type**: one [`ConversationState`] (append-only messages plus `sender`)
//!   flows through every node, state in and state out.
//! - **Explicit wiring**: the [`Orchestrator`] is built from [`AgentSpec`]s and a
//!   [`ToolRegistry`] handed in by the caller; nothing is global.
//! - **Bounded runs**: every run has a step limit and a cancellation token ([`RunConfig`]).
//! - **Tool failures are data**: a failing tool becomes a `tool` message the agent can
//!   read; only completion failures abort a run.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`], conditional edges,
//!   [`NodeMiddleware`].
//! - [`agent`]: [`AgentSpec`], [`AgentNode`], [`route`], [`ToolExecNode`].
//! - [`pipeline`]: [`Orchestrator`], [`leadgen_pipeline`].
//! - [`llm`]: [`CompletionService`], [`ChatOpenAI`], [`MockLlm`].
//! - [`tools`]: [`Tool`], [`ToolRegistry`], [`LeadFinderTool`], [`LeadExtractorTool`],
//!   [`FieldExtractor`].
//! - [`state`], [`message`], [`stream`], [`error`], [`prompts`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use leadgen::{leadgen_pipeline, ChatOpenAI, LeadExtractorTool, LeadFinderTool};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(ChatOpenAI::new(std::env::var("OPENAI_API_KEY")?, "gpt-4o-mini"));
//! let search = Arc::new(ChatOpenAI::perplexity(std::env::var("PERPLEXITY_API_KEY")?, "sonar-pro"));
//! let pipeline = leadgen_pipeline(llm, LeadFinderTool::new(search), LeadExtractorTool::new())?;
//!
//! let state = pipeline.run("Pet-food companies in India open to acquisitions").await?;
//! if let Some(answer) = pipeline.final_answer(&state) {
//!     println!("{}", answer);
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod pipeline;
pub mod prompts;
pub mod state;
pub mod stream;
pub mod tools;

pub use agent::{route, AgentNode, AgentSpec, Route, ToolExecNode, TOOL_NODE};
pub use error::{
    AgentError, CompletionError, CompletionErrorKind, ToolError, ToolErrorKind,
};
pub use graph::{
    CompilationError, CompiledStateGraph, LoggingNodeMiddleware, Next, Node, NodeMiddleware,
    RunConfig, StateGraph, DEFAULT_MAX_STEPS, END, START,
};
pub use llm::{ChatOpenAI, CompletionService, MockLlm, MockReply};
pub use message::{Message, Role, ToolCall};
pub use pipeline::{
    leadgen_pipeline, leadgen_pipeline_with, BuildError, Orchestrator, LEAD_ENRICHER_AGENT,
    LEAD_FINDER_AGENT,
};
pub use state::ConversationState;
pub use stream::StreamEvent;
pub use tools::{
    ExtractedFields, FieldExtractor, HeadingFieldExtractor, Lead, LeadExtractorTool,
    LeadFinderTool, MetaFieldExtractor, Tool, ToolRegistry, ToolSpec,
};

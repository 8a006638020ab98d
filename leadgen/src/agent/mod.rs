//! Agents of the lead-generation pipeline and the nodes that run them.
//!
//! - [`AgentSpec`]: name, instruction, bound tool names and completion backend.
//! - [`AgentNode`]: one agent step as a graph node.
//! - [`route`]: decides between tool execution and the next agent.
//! - [`ToolExecNode`]: the shared `call_tool` node executing pending tool calls.

mod agent_node;
mod router;
mod spec;
mod tool_exec_node;

pub use agent_node::AgentNode;
pub use router::{route, Route};
pub use spec::AgentSpec;
pub use tool_exec_node::{ToolExecNode, TOOL_NODE};

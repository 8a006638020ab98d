use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ToolError;
use crate::tools::r#trait::Tool;
use crate::tools::ToolSpec;

/// Tools by name.
///
/// Built once before the orchestrator and handed to it by value; agents bind a subset
/// of its tools by name.
///
/// ```
/// use leadgen::tools::ToolRegistry;
///
/// let registry = ToolRegistry::new();
/// assert!(registry.is_empty());
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its own name; replaces any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!(tool = %name, "tool registered twice; keeping the latest");
        }
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Specs of all registered tools, sorted by name.
    pub fn list(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|t| t.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Calls tool `name`; an unregistered name is `NotFound`.
    pub async fn call(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        match self.tools.get(name) {
            Some(tool) => tool.call(args).await,
            None => Err(ToolError::not_found(format!("unknown tool: {}", name))),
        }
    }
}

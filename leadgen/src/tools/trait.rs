use async_trait::async_trait;
use serde_json::Value;

use crate::error::ToolError;
use crate::tools::ToolSpec;

/// A single tool that an agent can request.
///
/// Each tool has a unique name, a specification (description and JSON schema) and the
/// call logic. Tools are registered in a [`ToolRegistry`](crate::tools::ToolRegistry)
/// and invoked by the tool-execution node.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use serde_json::{json, Value};
/// use leadgen::error::ToolError;
/// use leadgen::tools::{Tool, ToolSpec};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     fn spec(&self) -> ToolSpec {
///         ToolSpec::new("echo", "Returns its input", json!({"type": "object"}))
///     }
///
///     async fn call(&self, args: Value) -> Result<Value, ToolError> {
///         Ok(args)
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name; the model requests the tool by this name.
    fn name(&self) -> &str;

    /// Specification sent to the completion service.
    fn spec(&self) -> ToolSpec;

    /// Executes the tool.
    ///
    /// # Errors
    ///
    /// - `Validation`: arguments do not match the input schema
    /// - `Network`: the outbound call failed
    /// - `Parse`: the remote response could not be read
    /// - `NotFound`: the requested resource or result does not exist
    async fn call(&self, args: Value) -> Result<Value, ToolError>;
}

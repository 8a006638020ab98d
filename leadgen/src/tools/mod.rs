//! Tools callable by agents, plus the registry the tool-execution node looks them up in.
//!
//! Every tool validates its input before touching the network (serde deserialization
//! into a typed input struct plus field checks); a bad input is `ToolError::Validation`.
//! A tool makes at most one outbound call per invocation and never retries.

mod extract;
mod lead_extractor;
mod lead_finder;
mod registry;
mod r#trait;

pub use extract::{
    ExtractedFields, FieldExtractor, HeadingFieldExtractor, MetaFieldExtractor, NOT_FOUND_TEXT,
};
pub use lead_extractor::{LeadExtractorTool, TOOL_LEAD_EXTRACTOR};
pub use lead_finder::{
    parse_leads, rank_leads, search_prompt, Lead, LeadFinderTool, SEARCH_SYSTEM_PROMPT,
    TOOL_LEAD_FINDER,
};
pub use r#trait::Tool;
pub use registry::ToolRegistry;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Tool description handed to the completion service: name, description and JSON
/// Schema of the arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema,
        }
    }
}

/// Deserializes tool arguments into `T`; any mismatch is a validation error.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args)
        .map_err(|e| ToolError::validation(format!("invalid arguments for {}: {}", tool, e)))
}

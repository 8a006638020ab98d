//! LeadExtractor tool: fetches a company page and extracts lead fields from it.
//!
//! One HTTP GET per call via [`reqwest::Client`]; the HTML is handed to a
//! [`FieldExtractor`] (default [`HeadingFieldExtractor`]).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::error::ToolError;
use crate::tools::extract::{FieldExtractor, HeadingFieldExtractor};
use crate::tools::{parse_args, Tool, ToolSpec};

/// Tool name for lead extraction.
pub const TOOL_LEAD_EXTRACTOR: &str = "LeadExtractor";

#[derive(Debug, Deserialize)]
struct LeadExtractorInput {
    url: String,
}

/// Extracts lead information (company name, mission) from a URL.
///
/// | outcome                              | result          |
/// |--------------------------------------|-----------------|
/// | not an absolute http(s) URL          | `Validation`    |
/// | transport failure, non-2xx status    | `Network`       |
/// | HTTP 404 / 410                       | `NotFound`      |
/// | body cannot be read as text          | `Parse`         |
pub struct LeadExtractorTool {
    client: reqwest::Client,
    extractor: Arc<dyn FieldExtractor>,
    timeout: Option<Duration>,
}

impl Default for LeadExtractorTool {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadExtractorTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            extractor: Arc::new(HeadingFieldExtractor),
            timeout: None,
        }
    }

    /// Uses a different extraction strategy.
    pub fn with_extractor(self, extractor: Arc<dyn FieldExtractor>) -> Self {
        Self { extractor, ..self }
    }

    /// Uses a preconfigured reqwest client (proxy, user agent).
    pub fn with_client(self, client: reqwest::Client) -> Self {
        Self { client, ..self }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }
}

fn validate_url(raw: &str) -> Result<Url, ToolError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ToolError::validation(format!("invalid url '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ToolError::validation(format!(
            "unsupported url scheme '{}', expected http or https",
            other
        ))),
    }
}

#[async_trait]
impl Tool for LeadExtractorTool {
    fn name(&self) -> &str {
        TOOL_LEAD_EXTRACTOR
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            TOOL_LEAD_EXTRACTOR,
            "A tool for extracting lead information from a given url.",
            json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Url to extract data from"
                    }
                },
                "required": ["url"]
            }),
        )
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let input: LeadExtractorInput = parse_args(TOOL_LEAD_EXTRACTOR, args)?;
        let url = validate_url(&input.url)?;

        let mut request = self.client.get(url.clone());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ToolError::network(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if status.as_u16() == 404 || status.as_u16() == 410 {
            return Err(ToolError::not_found(format!("{} returned {}", url, status)));
        }
        if !status.is_success() {
            return Err(ToolError::network(format!("{} returned {}", url, status)));
        }
        let html = response
            .text()
            .await
            .map_err(|e| ToolError::parse(format!("unreadable body from {}: {}", url, e)))?;

        let fields = self.extractor.extract(&html);
        tracing::debug!(tool = TOOL_LEAD_EXTRACTOR, url = %url, company = %fields.company_name, "page extracted");
        Ok(json!({
            "url": url.as_str(),
            "company_name": fields.company_name,
            "company_mission": fields.company_mission,
        }))
    }
}

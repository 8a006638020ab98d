//! LeadFinderTool: finds companies open to acquisitions via a search-grounded model.
//!
//! Builds one search prompt from the input, sends it to a [`CompletionService`]
//! (Perplexity `sonar-pro` in production, any OpenAI-compatible model works), parses the
//! answer into [`Lead`]s and returns them ranked by keyword relevance.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{CompletionErrorKind, ToolError};
use crate::llm::CompletionService;
use crate::message::Message;
use crate::tools::extract::NOT_FOUND_TEXT;
use crate::tools::{parse_args, Tool, ToolSpec};

/// Tool name for lead finding.
pub const TOOL_LEAD_FINDER: &str = "LeadFinderTool";

/// System instruction sent with the search prompt.
pub const SEARCH_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

static FIELD_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^[\s\-\*\d\.\)"]*(company[_ ]name|name|website|url|industry|acquisition[_ ]history|strategic[_ ]fit|relevance)"?\s*[:=]\s*(.+)$"#,
    )
    .expect("field line regex")
});

/// One candidate acquirer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub company_name: String,
    pub website: String,
    pub industry: String,
    pub acquisition_history: String,
    pub strategic_fit: String,
    pub relevance: String,
}

impl Lead {
    fn named(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            website: NOT_FOUND_TEXT.to_string(),
            industry: NOT_FOUND_TEXT.to_string(),
            acquisition_history: NOT_FOUND_TEXT.to_string(),
            strategic_fit: NOT_FOUND_TEXT.to_string(),
            relevance: NOT_FOUND_TEXT.to_string(),
        }
    }

    fn set(&mut self, field: &str, value: String) {
        let slot = match field {
            "website" | "url" => &mut self.website,
            "industry" => &mut self.industry,
            "acquisition_history" => &mut self.acquisition_history,
            "strategic_fit" => &mut self.strategic_fit,
            "relevance" => &mut self.relevance,
            _ => return,
        };
        *slot = value;
    }

    fn haystack(&self) -> String {
        [
            self.company_name.as_str(),
            self.industry.as_str(),
            self.acquisition_history.as_str(),
            self.strategic_fit.as_str(),
            self.relevance.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

#[derive(Debug, Deserialize)]
struct LeadFinderInput {
    query: String,
    location: String,
    #[serde(default)]
    industry_keywords: Vec<String>,
    #[serde(default)]
    relevance_keywords: Vec<String>,
}

/// Search prompt for `query` in `location`.
pub fn search_prompt(query: &str, location: &str) -> String {
    format!(
        "Find companies in {} that are in the {} industry and are actively acquiring or open to acquisitions. \
         Provide details such as name, industry, acquisition history, and strategic fit.",
        location, query
    )
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(' ', "_")
}

fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_text).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        other => Some(other.to_string()),
    }
}

fn lead_from_object(obj: &Map<String, Value>) -> Option<Lead> {
    let mut name = None;
    let mut fields = Vec::new();
    for (key, value) in obj {
        let key = normalize_key(key);
        let Some(text) = value_text(value) else {
            continue;
        };
        match key.as_str() {
            "company_name" | "name" | "company" => name = Some(text),
            _ => fields.push((key, text)),
        }
    }
    let mut lead = Lead::named(name?);
    for (key, text) in fields {
        lead.set(&key, text);
    }
    Some(lead)
}

/// Leads from the first JSON array embedded in `answer` that yields any. Each `[` is
/// tried in turn, so citation markers such as `[1]` around the array are skipped.
fn parse_json_leads(answer: &str) -> Option<Vec<Lead>> {
    answer.match_indices('[').find_map(|(start, _)| {
        let items = serde_json::Deserializer::from_str(&answer[start..])
            .into_iter::<Vec<Value>>()
            .next()?
            .ok()?;
        let leads: Vec<Lead> = items
            .iter()
            .filter_map(|v| v.as_object().and_then(lead_from_object))
            .collect();
        (!leads.is_empty()).then_some(leads)
    })
}

/// Leads from `company_name: ...` lines; following `field: value` lines fill the
/// current lead, missing fields stay "Not found".
fn parse_line_leads(answer: &str) -> Vec<Lead> {
    let mut leads: Vec<Lead> = Vec::new();
    for line in answer.lines() {
        let Some(caps) = FIELD_LINE_RE.captures(line) else {
            continue;
        };
        let key = normalize_key(&caps[1]);
        let value = caps[2]
            .trim()
            .trim_end_matches(',')
            .trim_matches(|c| c == '*' || c == '"')
            .trim()
            .to_string();
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "company_name" | "name" => leads.push(Lead::named(value)),
            _ => {
                if let Some(current) = leads.last_mut() {
                    current.set(&key, value);
                }
            }
        }
    }
    leads
}

/// Parses a model answer into leads: a JSON array anywhere in the text wins, otherwise
/// `company_name:` lines are read.
pub fn parse_leads(answer: &str) -> Vec<Lead> {
    parse_json_leads(answer).unwrap_or_else(|| parse_line_leads(answer))
}

/// Stable sort by number of keyword hits, most relevant first.
pub fn rank_leads(mut leads: Vec<Lead>, keywords: &[String]) -> Vec<Lead> {
    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return leads;
    }
    leads.sort_by_cached_key(|lead| {
        let haystack = lead.haystack();
        Reverse(keywords.iter().filter(|k| haystack.contains(k.as_str())).count())
    });
    leads
}

/// Finds companies in an industry and location that are acquiring or open to acquisitions.
pub struct LeadFinderTool {
    search: Arc<dyn CompletionService>,
}

impl LeadFinderTool {
    /// `search` answers the search prompt; use a search-grounded model for real results.
    pub fn new(search: Arc<dyn CompletionService>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Tool for LeadFinderTool {
    fn name(&self) -> &str {
        TOOL_LEAD_FINDER
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            TOOL_LEAD_FINDER,
            "Find companies in a specific industry and location that are actively acquiring or open to acquisitions. \
             Use the query input parameter to search for the niche, and the location for the specific location.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query to look up leads (e.g., pet food, pet grooming)"
                    },
                    "location": {
                        "type": "string",
                        "description": "Location of the query (e.g., India)"
                    },
                    "industry_keywords": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Keywords related to the industry (e.g., pet food, pet grooming)"
                    },
                    "relevance_keywords": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Keywords related to relevance (e.g., acquisition, investment)"
                    }
                },
                "required": ["query", "location"]
            }),
        )
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let input: LeadFinderInput = parse_args(TOOL_LEAD_FINDER, args)?;
        if input.query.trim().is_empty() {
            return Err(ToolError::validation("query cannot be empty"));
        }
        if input.location.trim().is_empty() {
            return Err(ToolError::validation("location cannot be empty"));
        }

        let prompt = search_prompt(input.query.trim(), input.location.trim());
        let answer = self
            .search
            .complete(&[Message::user(prompt)], &[], SEARCH_SYSTEM_PROMPT)
            .await
            .map_err(|e| match e.kind {
                CompletionErrorKind::MalformedResponse => ToolError::parse(e.to_string()),
                _ => ToolError::network(e.to_string()),
            })?;

        let leads = parse_leads(&answer.content);
        if leads.is_empty() {
            return Err(ToolError::not_found(format!(
                "no companies found for '{}' in {}",
                input.query, input.location
            )));
        }
        let keywords: Vec<String> = input
            .relevance_keywords
            .into_iter()
            .chain(input.industry_keywords)
            .collect();
        let ranked = rank_leads(leads, &keywords);
        tracing::debug!(tool = TOOL_LEAD_FINDER, leads = ranked.len(), "leads found");
        serde_json::to_value(ranked).map_err(|e| ToolError::parse(e.to_string()))
    }
}

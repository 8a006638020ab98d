//! Typed settings read from the environment after [`load_and_apply`](crate::load_and_apply).

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SEARCH_MODEL: &str = "sonar-pro";
pub const DEFAULT_MAX_STEPS: usize = 25;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{0} is not set (env, .env or config.toml [env])")]
    Missing(&'static str),
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the CLI needs to build the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `OPENAI_API_KEY`, required.
    pub openai_api_key: String,
    /// `OPENAI_BASE_URL`, for OpenAI-compatible gateways.
    pub openai_base_url: Option<String>,
    /// `LEADGEN_MODEL`, the agents' reasoning model.
    pub model: String,
    /// `PERPLEXITY_API_KEY`; without it the lead search uses the OpenAI model.
    pub perplexity_api_key: Option<String>,
    pub perplexity_base_url: Option<String>,
    /// `LEADGEN_SEARCH_MODEL`.
    pub search_model: String,
    /// `LEADGEN_MAX_STEPS`.
    pub max_steps: usize,
    /// `LEADGEN_HTTP_TIMEOUT_SECS`, per HTTP request.
    pub http_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let openai_api_key = get("OPENAI_API_KEY").ok_or(SettingsError::Missing("OPENAI_API_KEY"))?;
        let max_steps = match get("LEADGEN_MAX_STEPS") {
            Some(raw) => parse_positive("LEADGEN_MAX_STEPS", &raw)? as usize,
            None => DEFAULT_MAX_STEPS,
        };
        let timeout_secs = match get("LEADGEN_HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_positive("LEADGEN_HTTP_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL"),
            model: get("LEADGEN_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            perplexity_api_key: get("PERPLEXITY_API_KEY"),
            perplexity_base_url: get("PERPLEXITY_BASE_URL"),
            search_model: get("LEADGEN_SEARCH_MODEL")
                .unwrap_or_else(|| DEFAULT_SEARCH_MODEL.to_string()),
            max_steps,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, SettingsError> {
    let invalid = |reason: String| SettingsError::Invalid {
        key,
        value: raw.to_string(),
        reason,
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(invalid("must be greater than zero".to_string())),
        Ok(n) => Ok(n),
        Err(e) => Err(invalid(e.to_string())),
    }
}

//! One pipeline run: build from settings, execute (optionally streaming), print.

pub mod display;

use std::io::Write;
use std::sync::Arc;

use config::{Settings, SettingsError};
use leadgen::{
    leadgen_pipeline_with, AgentError, BuildError, ChatOpenAI, CompletionService,
    ConversationState, HeadingFieldExtractor, LeadExtractorTool, LeadFinderTool,
    LoggingNodeMiddleware, MetaFieldExtractor, NodeMiddleware, Orchestrator, RunConfig,
    StreamEvent,
};
use serde_json::json;
use thiserror::Error;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use display::format_message;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("invalid pipeline: {0}")]
    Build(#[from] BuildError),
    #[error(transparent)]
    Run(#[from] AgentError),
    #[error("requirement is empty")]
    EmptyRequirement,
    #[error("{0}")]
    Stream(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// How the enricher's LeadExtractor reads company pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExtractorKind {
    /// `<title>` and the heading that mentions the mission.
    #[default]
    Heading,
    /// `og:site_name` and the description meta tags.
    Meta,
}

/// Options for one run; `None` fields fall back to [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub requirement: String,
    pub model: Option<String>,
    pub search_model: Option<String>,
    pub max_steps: Option<usize>,
    pub extractor: ExtractorKind,
    pub stream: bool,
    pub json: bool,
    pub verbose: bool,
}

fn openai(settings: &Settings, model: &str) -> ChatOpenAI {
    let llm = ChatOpenAI::new(settings.openai_api_key.clone(), model)
        .with_timeout(settings.http_timeout);
    match settings.openai_base_url {
        Some(ref url) => llm.with_base_url(url.clone()),
        None => llm,
    }
}

/// Agents reason with the OpenAI model; lead search goes to Perplexity when a key is
/// configured, otherwise to the same OpenAI model.
pub fn build_pipeline(settings: &Settings, opts: &RunOptions) -> Result<Orchestrator, CliError> {
    let model = opts.model.as_deref().unwrap_or(&settings.model);
    let llm: Arc<dyn CompletionService> = Arc::new(openai(settings, model));

    let search: Arc<dyn CompletionService> = match settings.perplexity_api_key {
        Some(ref key) => {
            let search_model = opts
                .search_model
                .as_deref()
                .unwrap_or(&settings.search_model);
            let search = ChatOpenAI::perplexity(key.clone(), search_model)
                .with_timeout(settings.http_timeout);
            Arc::new(match settings.perplexity_base_url {
                Some(ref url) => search.with_base_url(url.clone()),
                None => search,
            })
        }
        None => {
            tracing::warn!("PERPLEXITY_API_KEY not set; lead search uses {}", model);
            llm.clone()
        }
    };

    let extractor = LeadExtractorTool::new().with_timeout(settings.http_timeout);
    let extractor = match opts.extractor {
        ExtractorKind::Heading => extractor.with_extractor(Arc::new(HeadingFieldExtractor)),
        ExtractorKind::Meta => extractor.with_extractor(Arc::new(MetaFieldExtractor)),
    };

    let middleware: Option<Arc<dyn NodeMiddleware<ConversationState>>> = if opts.verbose {
        Some(Arc::new(LoggingNodeMiddleware::<ConversationState>::default()))
    } else {
        None
    };

    Ok(leadgen_pipeline_with(
        llm,
        LeadFinderTool::new(search),
        extractor,
        middleware,
    )?)
}

fn write_line(out: &mut impl Write, line: &str) -> Result<(), CliError> {
    writeln!(out, "{}", line)?;
    out.flush()?;
    Ok(())
}

/// Runs the pipeline once and writes the result to `out`.
///
/// | mode            | output                                                      |
/// |-----------------|-------------------------------------------------------------|
/// | text            | the final answer                                            |
/// | text, stream    | each new message as it is appended                          |
/// | json            | `{"reply", "messages"}`                                     |
/// | json, stream    | one `{"type":"node"}` line per node, then `end` or `error`  |
pub async fn run(
    settings: &Settings,
    opts: &RunOptions,
    cancellation: CancellationToken,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let requirement = opts.requirement.trim();
    if requirement.is_empty() {
        return Err(CliError::EmptyRequirement);
    }
    let pipeline = build_pipeline(settings, opts)?;
    let config = RunConfig::default()
        .with_max_steps(opts.max_steps.unwrap_or(settings.max_steps))
        .with_cancellation(cancellation);

    if !opts.stream {
        let state = pipeline.run_with_config(requirement, config).await?;
        let reply = pipeline.final_answer(&state).unwrap_or_default();
        if opts.json {
            let value = json!({ "reply": reply, "messages": state.messages() });
            write_line(out, &serde_json::to_string(&value)?)?;
        } else {
            write_line(out, reply)?;
        }
        return Ok(());
    }

    let mut events = pipeline.stream(requirement, Some(config));
    let mut seen = 0usize;
    while let Some(event) = events.next().await {
        match event {
            StreamEvent::Updates { node_id, state } => {
                let new = state.messages().get(seen..).unwrap_or_default();
                seen = state.len();
                if opts.json {
                    let value = json!({ "type": "node", "node": node_id, "messages": new });
                    write_line(out, &serde_json::to_string(&value)?)?;
                } else {
                    for m in new {
                        write_line(out, &format_message(m))?;
                    }
                }
            }
            StreamEvent::End(state) => {
                if opts.json {
                    let reply = pipeline.final_answer(&state).unwrap_or_default();
                    let value = json!({ "type": "end", "reply": reply });
                    write_line(out, &serde_json::to_string(&value)?)?;
                }
                return Ok(());
            }
            StreamEvent::Error(message) => {
                if opts.json {
                    let value = json!({ "type": "error", "message": message });
                    write_line(out, &serde_json::to_string(&value)?)?;
                }
                return Err(CliError::Stream(message));
            }
        }
    }
    Ok(())
}

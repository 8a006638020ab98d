//! Lead-generation pipeline assembly.

mod orchestrator;

pub use orchestrator::{
    leadgen_pipeline, leadgen_pipeline_with, BuildError, Orchestrator, LEAD_ENRICHER_AGENT,
    LEAD_FINDER_AGENT,
};

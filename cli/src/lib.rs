//! Library side of the `leadgen` binary: builds the pipeline from [`config::Settings`]
//! and renders runs as text or JSON.

mod run;

pub use run::{build_pipeline, run, CliError, ExtractorKind, RunOptions};
pub use run::display::{format_message, truncate_display};

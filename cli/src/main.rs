//! `leadgen` binary: find acquirers for a requirement and enrich them from their websites.

mod logging;

use std::io::{BufRead, Write};

use clap::Parser;
use cli::{run, CliError, ExtractorKind, RunOptions};
use config::Settings;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "leadgen")]
#[command(about = "Leadgen: find companies open to acquisitions and enrich them from their websites")]
struct Args {
    /// Requirement, e.g. "pet-food companies in India open to acquisitions".
    /// Read from stdin when omitted.
    #[arg(trailing_var_arg = true)]
    requirement: Vec<String>,

    /// Model the agents reason with (default: LEADGEN_MODEL or gpt-4o-mini)
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Model for lead search (default: LEADGEN_SEARCH_MODEL or sonar-pro)
    #[arg(long, value_name = "MODEL")]
    search_model: Option<String>,

    /// Maximum node executions per run (default: LEADGEN_MAX_STEPS or 25)
    #[arg(long, value_name = "N")]
    max_steps: Option<usize>,

    /// How company pages are read
    #[arg(long, value_enum, default_value_t = ExtractorKind::Heading)]
    extractor: ExtractorKind,

    /// Print every message as it is appended instead of only the final answer
    #[arg(long)]
    stream: bool,

    /// Output JSON (one line per event with --stream)
    #[arg(long)]
    json: bool,

    /// Verbose: log node enter/exit and graph execution to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn read_requirement() -> Result<String, CliError> {
    eprint!("Enter your requirement: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn run_main(args: Args) -> Result<(), CliError> {
    let settings = Settings::from_env()?;
    let requirement = if args.requirement.is_empty() {
        read_requirement()?
    } else {
        args.requirement.join(" ")
    };
    let opts = RunOptions {
        requirement,
        model: args.model,
        search_model: args.search_model,
        max_steps: args.max_steps,
        extractor: args.extractor,
        stream: args.stream,
        json: args.json,
        verbose: args.verbose,
    };

    let cancellation = CancellationToken::new();
    let on_ctrl_c = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; stopping after the current step");
            on_ctrl_c.cancel();
        }
    });

    let mut stdout = std::io::stdout().lock();
    run(&settings, &opts, cancellation, &mut stdout).await
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_and_apply("leadgen", None) {
        eprintln!("leadgen: config: {}", e);
    }
    let args = Args::parse();
    if let Err(e) = logging::init(args.verbose) {
        eprintln!("leadgen: logging: {}", e);
    }

    if let Err(e) = run_main(args).await {
        eprintln!("leadgen: {}", e);
        std::process::exit(1);
    }
}

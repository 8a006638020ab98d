//! Logging for the binary: human-readable lines on stderr so stdout stays the answer.
//!
//! `RUST_LOG` wins when set; otherwise `warn`, or `info` for leadgen with `--verbose`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub fn init(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default = if verbose { "warn,leadgen=info,cli=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_filter(filter),
        )
        .try_init()?;
    Ok(())
}

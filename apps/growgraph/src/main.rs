//! # growgraph
//!
//! The main binary for the growgraph synthetic dataset generator.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/growgraph (THE BINARY)        │
//! │                                               │
//! │   ┌─────────────┐        ┌────────────────┐   │
//! │   │    CLI      │        │  Config (TOML) │   │
//! │   │   (clap)    │        │                │   │
//! │   └──────┬──────┘        └───────┬────────┘   │
//! │          └───────────┬───────────┘            │
//! │                      ▼                        │
//! │             ┌────────────────┐                │
//! │             │ growgraph-core │                │
//! │             │  (THE LOGIC)   │                │
//! │             └────────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! growgraph definitions
//! growgraph generate -d road_network --seed 7 --scale 5000
//! growgraph generate --emit > instructions.jsonl
//! growgraph sample -d social_network -n 20
//! ```

use clap::Parser;
use growgraph::cli;
use growgraph::config::{LOG_FORMAT_ENV, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();
    let config = cli::resolve_config(&cli);

    // GROWGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let env_format = std::env::var(LOG_FORMAT_ENV).ok();
    let log_format = match &config {
        Ok(config) => config.log_format(env_format.as_deref()),
        Err(_) => env_format.as_deref().map_or(LogFormat::Text, LogFormat::from_name),
    };
    init_tracing(log_format, cli.verbose);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli, config) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat, verbose: bool) {
    let default_filter = if verbose {
        "growgraph=debug,growgraph_core=debug"
    } else {
        "growgraph=info,growgraph_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Print the startup banner to stderr.
fn print_banner() {
    eprintln!(
        r#"
  growgraph v{}
  weighted schemas, hub-forming relations
"#,
        env!("CARGO_PKG_VERSION")
    );
}

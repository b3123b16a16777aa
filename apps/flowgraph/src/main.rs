//! # Flowgraph
//!
//! The main binary for the flowgraph editor model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │          apps/flowgraph (THE BINARY)         │
//! │                                              │
//! │   ┌─────────────┐      ┌────────────────┐    │
//! │   │   CLI       │      │  Script Runner │    │
//! │   │  (clap)     │─────▶│  (JSON Lines)  │    │
//! │   └─────────────┘      └───────┬────────┘    │
//! │                                ▼             │
//! │                      ┌─────────────────┐     │
//! │                      │ flowgraph-core  │     │
//! │                      │  (THE LOGIC)    │     │
//! │                      └─────────────────┘     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! flowgraph replay -f edits.jsonl --state
//! flowgraph --json-mode replay -f edits.jsonl
//! flowgraph check -f edits.jsonl
//! ```

use clap::Parser;
use flowgraph::cli::{self, Cli};
use flowgraph::config::{Config, DEFAULT_LOG_FILTER, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = Cli::parse();

    // Config errors are reported before logging exists.
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config, cli.verbose);

    if let Err(e) = cli::execute(cli, &config) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing. FLOWGRAPH_LOG_FORMAT=json overrides the config format.
fn init_tracing(config: &Config, verbose: bool) {
    let format = match std::env::var("FLOWGRAPH_LOG_FORMAT").as_deref() {
        Ok("json") => LogFormat::Json,
        Ok("text") => LogFormat::Text,
        _ => config.log.format,
    };

    let default_filter = if verbose {
        "flowgraph=debug,flowgraph_core=debug".to_string()
    } else {
        config
            .log
            .filter
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
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

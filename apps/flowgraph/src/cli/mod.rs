//! # Flowgraph CLI Module
//!
//! ## Available Commands
//!
//! - `replay` - Apply an editing script and print the change notifications
//! - `check` - Parse an editing script without applying it

mod commands;

use crate::config::{Config, GraphConfig};
use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Flowgraph - flow-based program graph editor
///
/// Replays scripted edits against an in-memory graph and reports every
/// change notification the model emits.
#[derive(Parser, Debug)]
#[command(name = "flowgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress summary output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML config file (default: ./flowgraph.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Graph name (overrides config)
    #[arg(short, long, global = true)]
    pub name: Option<String>,

    /// Compare port names case-sensitively (overrides config)
    #[arg(long, global = true)]
    pub case_sensitive: bool,

    /// Fold port names to lower case (overrides config)
    #[arg(long, global = true, conflicts_with = "case_sensitive")]
    pub case_insensitive: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply an editing script to a fresh graph
    Replay {
        /// Path to the script (JSON Lines)
        #[arg(short, long)]
        file: PathBuf,

        /// Print the final graph after the event stream
        #[arg(short, long)]
        state: bool,
    },

    /// Parse an editing script without applying it
    Check {
        /// Path to the script (JSON Lines)
        #[arg(short, long)]
        file: PathBuf,
    },
}

impl Cli {
    /// Graph settings from the config file with command-line overrides applied.
    #[must_use]
    pub fn graph_config(&self, config: &Config) -> GraphConfig {
        let mut graph = config.graph.clone();
        if let Some(name) = &self.name {
            graph.name.clone_from(name);
        }
        if self.case_sensitive {
            graph.case_sensitive = true;
        } else if self.case_insensitive {
            graph.case_sensitive = false;
        }
        graph
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli, config: &Config) -> Result<(), AppError> {
    let json_mode = cli.json_mode;
    let graph_config = cli.graph_config(config);

    match cli.command {
        Commands::Replay { file, state } => {
            cmd_replay(&file, &graph_config, state, json_mode, cli.quiet)
        }
        Commands::Check { file } => cmd_check(&file, json_mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let config = Config::from_toml("[graph]\nname = \"file\"\n").expect("parse");
        let cli = Cli::parse_from([
            "flowgraph",
            "--name",
            "flag",
            "--case-sensitive",
            "check",
            "-f",
            "x.jsonl",
        ]);

        let graph = cli.graph_config(&config);

        assert_eq!(graph.name, "flag");
        assert!(graph.case_sensitive);
    }

    #[test]
    fn case_insensitive_flag_overrides_config() {
        let config = Config::from_toml("[graph]\ncase_sensitive = true\n").expect("parse");
        let cli = Cli::parse_from(["flowgraph", "--case-insensitive", "check", "-f", "x.jsonl"]);

        assert!(!cli.graph_config(&config).case_sensitive);
    }

    #[test]
    fn conflicting_case_flags_rejected() {
        let result = Cli::try_parse_from([
            "flowgraph",
            "--case-sensitive",
            "--case-insensitive",
            "check",
            "-f",
            "x.jsonl",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn config_used_without_flags() {
        let config =
            Config::from_toml("[graph]\nname = \"file\"\ncase_sensitive = true\n").expect("parse");
        let cli = Cli::parse_from(["flowgraph", "replay", "-f", "x.jsonl", "--state"]);

        let graph = cli.graph_config(&config);

        assert_eq!(graph.name, "file");
        assert!(graph.case_sensitive);
        assert!(matches!(cli.command, Commands::Replay { state: true, .. }));
    }
}

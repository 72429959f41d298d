//! CLI module for Curio.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{ConsoleObserver, Output};

use crate::orchestrator::Scenario;
use clap::{Parser, Subcommand};

/// Curio - tool-calling agents for podcasts and learning resources
///
/// Give a model a goal and a catalog of tools, and watch it decide what to call.
#[derive(Parser, Debug)]
#[command(name = "curio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by the agent commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Model to drive the agent loop
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum number of model round trips
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Let the podcast agent work toward a goal
    Podcast {
        /// What you want from your podcasts
        #[arg(required_unless_present = "scenario", conflicts_with = "scenario")]
        goal: Option<String>,

        /// Use a preset goal instead
        #[arg(short, long, value_enum)]
        scenario: Option<Scenario>,

        /// Use iTunes, RSS feeds and the model instead of fixture data
        #[arg(long)]
        live: bool,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Find learning resources on a topic
    Discover {
        /// Topic to learn about
        topic: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// List the tools available to the agents
    Tools,

    /// Show or prune the reading list
    Saved {
        /// Remove the item with this id
        #[arg(long)]
        remove: Option<String>,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Start MCP server exposing the agent tools
    Mcp,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_podcast_needs_goal_or_scenario() {
        assert!(Cli::try_parse_from(["curio", "podcast"]).is_err());
        assert!(Cli::try_parse_from(["curio", "podcast", "--scenario", "busy"]).is_ok());
        assert!(Cli::try_parse_from(["curio", "podcast", "goal", "--scenario", "busy"]).is_err());
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "curio",
            "-vv",
            "discover",
            "rust",
            "--model",
            "gpt-4.1",
            "--max-iterations",
            "4",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Discover { topic, run } => {
                assert_eq!(topic, "rust");
                assert_eq!(run.model.as_deref(), Some("gpt-4.1"));
                assert_eq!(run.max_iterations, Some(4));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

//! CLI argument definitions for Corvus.

use clap::{Args, Parser, Subcommand};

use crate::commands::ListArgs;
use crate::config::OutputFormat;

/// Corvus - Search & Explore ShareableAI Models
#[derive(Parser, Debug)]
#[command(name = "corvus")]
#[command(author, version, about = "Search & Explore ShareableAI Models", long_about = None)]
pub struct Cli {
    /// Enable debug logging on stderr (overridden by CORVUS_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configure Corvus settings
    Set {
        #[command(subcommand)]
        command: SetCommands,
    },

    /// List models from local storage or ShareableAI Cloud
    ///
    /// A thin wrapper around artefact search; use the search library directly
    /// for programmatic use such as CI/CD.
    ///
    /// Output format can be set via `corvus set format` to either JSON or Table.
    List(ListCommand),

    /// Show the resolved configuration and where each value came from
    Show,
}

/// `corvus set` subcommands
#[derive(Subcommand, Debug)]
pub enum SetCommands {
    /// Set output format for displaying models
    Format {
        /// Output format
        #[arg(value_enum)]
        output_format: OutputFormat,
    },

    /// Set API Key for ShareableAI Cloud (prompts without echo)
    #[command(name = "api_key")]
    ApiKey {
        /// API key; prompted for when omitted
        #[arg(long = "api-key", alias = "api_key")]
        api_key: Option<String>,
    },
}

/// Arguments for `corvus list`
#[derive(Args, Debug, Clone, Default)]
pub struct ListCommand {
    /// Fetch models from local storage, typically ~/.artefact_registry.sqlite (default)
    #[arg(long, conflicts_with = "remote")]
    pub local: bool,

    /// Fetch all remote models the user has permission to view, either by user,
    /// group, or organisation
    #[arg(long)]
    pub remote: bool,

    /// Include child artefacts derived from other models
    #[arg(long)]
    pub all: bool,

    /// Filter models to those attached to a named repository, i.e. 'jackdaw'
    #[arg(long)]
    pub repo: Option<String>,

    /// Filter models to those attached to a given branch name, i.e. 'main'
    #[arg(long)]
    pub branch: Option<String>,
}

impl From<ListCommand> for ListArgs {
    fn from(cmd: ListCommand) -> Self {
        ListArgs {
            remote: cmd.remote,
            all: cmd.all,
            repo: cmd.repo,
            branch: cmd.branch,
        }
    }
}

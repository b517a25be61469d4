//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// podcdn - local mirror for CDN-hosted pod spec repositories
///
/// Answers pod, version and specification queries from a local cache that
/// is revalidated against the CDN with conditional requests.
#[derive(Parser, Debug)]
#[command(name = "podcdn")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PODCDN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository root (overrides --source)
    #[arg(short, long, global = true, env = "PODCDN_REPO")]
    pub repo: Option<PathBuf>,

    /// Source name under the configured repos directory
    #[arg(short, long, global = true)]
    pub source: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a new CDN source
    Add(AddArgs),

    /// Show details about the selected source
    Info,

    /// List all pod names
    Pods(PodsArgs),

    /// List the versions of a pod
    Versions(VersionsArgs),

    /// Print the local path of a specification
    Spec(SpecArgs),

    /// Look up a pod by name
    Search(SearchArgs),

    /// Prepare the source and revalidate cached indexes
    Refresh,

    /// Update the source
    Update,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the add command
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Source name (directory under the repos directory)
    pub name: String,

    /// CDN base URL
    pub url: String,

    /// Overwrite an existing source
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the pods command
#[derive(Parser, Debug)]
pub struct PodsArgs {
    /// Output format
    #[arg(short, long, default_value = "plain")]
    pub format: OutputFormat,
}

/// Arguments for the versions command
#[derive(Parser, Debug)]
pub struct VersionsArgs {
    /// Pod name
    pub pod: String,

    /// Output format
    #[arg(short, long, default_value = "plain")]
    pub format: OutputFormat,
}

/// Arguments for the spec command
#[derive(Parser, Debug)]
pub struct SpecArgs {
    /// Pod name
    pub pod: String,

    /// Version directory name
    #[arg(id = "spec_version", value_name = "VERSION")]
    pub version: String,
}

/// Arguments for the search command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Pod name, optionally with a subspec (Pod/Subspec)
    pub query: String,

    /// Search specification contents instead of names
    #[arg(long)]
    pub full_text: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cdn.max_workers)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

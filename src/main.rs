//! podcdn - local mirror for CDN-hosted pod spec repositories
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use podcdn::cli::{commands, Cli, Commands};
use podcdn::config::{Config, ConfigManager};
use podcdn::error::CdnResult;
use podcdn::ui::{self, UiContext};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CdnResult<()> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    if UiContext::detect().use_fancy_output() {
        ui::init_theme();
    }

    let root = cli.source_root(&config);
    debug!("Selected source at {}", root.display());

    match cli.command {
        Commands::Add(args) => commands::add(args, &config).await,
        Commands::Config(args) => commands::config(args, &config_manager, &config).await,
        Commands::Info => commands::info(&root, &config).await,
        Commands::Pods(args) => commands::pods(args, &root, &config).await,
        Commands::Versions(args) => commands::versions(args, &root, &config).await,
        Commands::Spec(args) => commands::spec(args, &root, &config).await,
        Commands::Search(args) => commands::search(args, &root, &config).await,
        Commands::Refresh => commands::refresh(&root, &config).await,
        Commands::Update => commands::update(&root, &config).await,
    }
}

/// Install the tracing subscriber: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("podcdn=warn"),
        1 => EnvFilter::new("podcdn=info"),
        _ => EnvFilter::new("podcdn=debug"),
    };

    if config.general.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}

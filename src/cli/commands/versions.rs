//! Versions command - list the versions of one pod

use super::open_source;
use crate::cdn::PodVersion;
use crate::cli::args::{OutputFormat, VersionsArgs};
use crate::config::Config;
use crate::error::{CdnError, CdnResult};
use console::style;
use std::path::Path;

/// Execute the versions command
pub async fn execute(args: VersionsArgs, root: &Path, config: &Config) -> CdnResult<()> {
    let source = open_source(root, config)?;
    let versions = source.versions(&args.pod).await?.ok_or_else(|| {
        CdnError::User(format!("No pod named `{}` in {}", args.pod, source.name()))
    })?;

    match args.format {
        OutputFormat::Table => print_table(&args.pod, &versions),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&versions)?),
        OutputFormat::Plain => {
            for version in &versions {
                println!("{}", version);
            }
        }
    }

    Ok(())
}

fn print_table(pod: &str, versions: &[PodVersion]) {
    println!(
        "{:<24} {:<12}",
        style("VERSION").bold(),
        style("CHANNEL").bold()
    );
    println!("{}", "-".repeat(36));

    for version in versions {
        let channel = if version.is_prerelease() {
            style("pre-release").yellow()
        } else {
            style("release").green()
        };
        println!("{:<24} {:<12}", version.as_str(), channel);
    }

    println!();
    println!("{} version(s) of {}", versions.len(), pod);
}

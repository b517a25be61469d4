//! Pods command - list every pod name

use super::open_source;
use crate::cli::args::{OutputFormat, PodsArgs};
use crate::config::Config;
use crate::error::CdnResult;
use console::style;
use std::path::Path;

/// Execute the pods command
pub async fn execute(args: PodsArgs, root: &Path, config: &Config) -> CdnResult<()> {
    let source = open_source(root, config)?;
    let pods = source.pods().await?;

    match args.format {
        OutputFormat::Table => {
            println!("{}", style("POD").bold());
            println!("{}", "-".repeat(40));
            for pod in &pods {
                println!("{}", pod);
            }
            println!();
            println!("{} pod(s)", pods.len());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&pods)?),
        OutputFormat::Plain => {
            for pod in &pods {
                println!("{}", pod);
            }
        }
    }

    Ok(())
}

//! Search command - find a pod by name

use super::open_source;
use crate::cli::args::{OutputFormat, SearchArgs};
use crate::config::Config;
use crate::error::{CdnError, CdnResult};
use crate::ui::{self, UiContext};
use std::path::Path;

/// Execute the search command
pub async fn execute(args: SearchArgs, root: &Path, config: &Config) -> CdnResult<()> {
    let source = open_source(root, config)?;

    if args.full_text {
        source.search_by_full_text(&args.query)?;
        return Ok(());
    }

    let entry = source.search(&args.query).await?.ok_or_else(|| {
        CdnError::User(format!("No pod matching `{}` in {}", args.query, source.name()))
    })?;

    match args.format {
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            let versions = entry
                .versions
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            ui::section(&ctx, &entry.name);
            if let Some(latest) = entry.highest_version() {
                ui::key_value(&ctx, "Latest", latest.as_str());
            }
            ui::key_value(&ctx, "Versions", &versions);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entry)?),
        OutputFormat::Plain => println!("{}", entry.name),
    }

    Ok(())
}

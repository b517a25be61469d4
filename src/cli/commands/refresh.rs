//! Refresh command - prepare the source and revalidate cached indexes

use super::open_source;
use crate::config::Config;
use crate::error::CdnResult;
use crate::ui::{TaskSpinner, UiContext};
use std::path::Path;

/// Execute the refresh command
pub async fn execute(root: &Path, config: &Config) -> CdnResult<()> {
    let source = open_source(root, config)?;
    let ctx = UiContext::detect();

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Refreshing {}...", source.name()));

    match source.refresh().await {
        Ok(summary) => {
            spinner.stop(&format!(
                "Refreshed {} (version marker {}, {} cached file(s) checked)",
                source.name(),
                summary.marker,
                summary.warmed
            ));
            Ok(())
        }
        Err(e) => {
            spinner.stop_error(&format!("Failed to refresh {}", source.name()));
            Err(e)
        }
    }
}

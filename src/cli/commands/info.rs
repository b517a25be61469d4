//! Info command - describe the selected source

use super::open_source;
use crate::config::Config;
use crate::error::CdnResult;
use crate::ui::{self, UiContext};
use std::path::Path;

/// Execute the info command
pub async fn execute(root: &Path, config: &Config) -> CdnResult<()> {
    let source = open_source(root, config)?;
    let ctx = UiContext::detect();

    ui::section(&ctx, source.name());
    ui::key_value(&ctx, "Kind", &source.kind().to_string());
    ui::key_value(&ctx, "URL", source.url());
    ui::key_value(&ctx, "Root", &source.root().display().to_string());
    ui::key_value(&ctx, "Git", if source.is_git() { "yes" } else { "no" });
    ui::key_value(&ctx, "Workers", &source.scheduler().workers().to_string());

    match source.last_refreshed() {
        Some(at) => ui::key_value_status(
            &ctx,
            "Last refresh",
            &at.format("%Y-%m-%d %H:%M").to_string(),
            true,
        ),
        None => ui::key_value_status(&ctx, "Last refresh", "never", false),
    }

    Ok(())
}

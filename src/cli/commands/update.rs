//! Update command

use super::open_source;
use crate::config::Config;
use crate::error::CdnResult;
use crate::ui::{self, UiContext};
use std::path::Path;

/// Execute the update command
pub async fn execute(root: &Path, config: &Config) -> CdnResult<()> {
    let source = open_source(root, config)?;
    let changed = source.update().await?;
    let ctx = UiContext::detect();

    if changed.is_empty() {
        ui::step_ok(&ctx, &format!("{} is up to date", source.name()));
        ui::remark(&ctx, "CDN sources revalidate specifications on every read");
    } else {
        for path in &changed {
            ui::step_info(&ctx, &path.display().to_string());
        }
    }

    Ok(())
}

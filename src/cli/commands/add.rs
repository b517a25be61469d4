//! Add command - register a new CDN source

use crate::cdn::CdnSource;
use crate::cli::args::AddArgs;
use crate::config::Config;
use crate::error::{CdnError, CdnResult};
use crate::ui::{self, UiContext};

/// Execute the add command
pub async fn execute(args: AddArgs, config: &Config) -> CdnResult<()> {
    validate_name(&args.name)?;

    let root = config.cdn.source_root(&args.name);
    CdnSource::create(&root, &args.url, args.force).await?;

    let ctx = UiContext::detect();
    ui::step_ok_detail(
        &ctx,
        &format!("Added source {}", args.name),
        &root.display().to_string(),
    );
    ui::remark(&ctx, &format!("Run: podcdn --source {} refresh", args.name));
    Ok(())
}

fn validate_name(name: &str) -> CdnResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(CdnError::invalid_argument(format!(
            "source name must be a plain directory name, got {:?}",
            name
        )));
    }
    Ok(())
}

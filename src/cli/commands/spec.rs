//! Spec command - print the local path of a specification

use super::open_source;
use crate::cli::args::SpecArgs;
use crate::config::Config;
use crate::error::CdnResult;
use std::path::Path;

/// Execute the spec command
pub async fn execute(args: SpecArgs, root: &Path, config: &Config) -> CdnResult<()> {
    let source = open_source(root, config)?;
    let path = source.specification_path(&args.pod, &args.version).await?;
    println!("{}", path.display());
    Ok(())
}

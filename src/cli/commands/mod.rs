//! CLI command implementations

pub mod add;
pub mod config;
pub mod info;
pub mod pods;
pub mod refresh;
pub mod search;
pub mod spec;
pub mod update;
pub mod versions;

pub use add::execute as add;
pub use config::execute as config;
pub use info::execute as info;
pub use pods::execute as pods;
pub use refresh::execute as refresh;
pub use search::execute as search;
pub use spec::execute as spec;
pub use update::execute as update;
pub use versions::execute as versions;

use crate::cdn::{CdnSource, SourceOptions, UreqClient};
use crate::config::Config;
use crate::error::CdnResult;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Open the source at `root` with an HTTP client built from configuration
fn open_source(root: &Path, config: &Config) -> CdnResult<CdnSource> {
    let client = UreqClient::new(
        Duration::from_secs(config.cdn.timeout_secs),
        &config.cdn.user_agent,
    );
    CdnSource::open(
        root,
        Arc::new(client),
        SourceOptions {
            max_workers: config.cdn.max_workers,
        },
    )
}

//! Run-local freshness tracking
//!
//! A cached file touched after the source was opened was already fetched or
//! revalidated by this process, so it is trusted for the rest of the run.
//! Across runs every file is revalidated again.

use std::path::Path;
use std::time::SystemTime;
use tokio::fs;

/// Remembers when the source was opened and answers freshness checks
#[derive(Debug, Clone, Copy)]
pub struct FreshnessTracker {
    startup: SystemTime,
}

impl FreshnessTracker {
    /// Start tracking from the current instant
    pub fn new() -> Self {
        Self::starting_at(SystemTime::now())
    }

    /// Start tracking from a given instant
    pub fn starting_at(startup: SystemTime) -> Self {
        Self { startup }
    }

    /// The instant this tracker treats as the start of the run
    pub fn startup(&self) -> SystemTime {
        self.startup
    }

    /// Whether `path` exists and was modified strictly after startup.
    ///
    /// Purely local: never touches the network.
    pub async fn is_fresh(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .and_then(|meta| meta.modified())
            .map(|modified| modified > self.startup)
            .unwrap_or(false)
    }
}

impl Default for FreshnessTracker {
    fn default() -> Self {
        Self::new()
    }
}

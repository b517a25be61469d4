//! Configuration schema for podcdn
//!
//! Configuration is stored at `~/.config/podcdn/config.toml`

use crate::cdn::prefetch::MAX_WORKERS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// CDN source settings
    pub cdn: CdnConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

impl GeneralConfig {
    /// Whether logs should be emitted as JSON lines
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// CDN source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnConfig {
    /// Directory holding one subdirectory per source
    pub repos_dir: PathBuf,

    /// Source used when `--source` is not given
    pub default_source: String,

    /// Concurrent prefetches (clamped to 1..=200)
    pub max_workers: usize,

    /// Transport timeout per request in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent to the CDN
    pub user_agent: String,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            repos_dir: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cocoapods")
                .join("repos"),
            default_source: "trunk".to_string(),
            max_workers: MAX_WORKERS,
            timeout_secs: 30,
            user_agent: format!("podcdn/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CdnConfig {
    /// Root directory of the named source
    pub fn source_root(&self, name: &str) -> PathBuf {
        self.repos_dir.join(name)
    }
}

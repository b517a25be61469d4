//! Command line interface

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};

use crate::config::Config;
use std::path::PathBuf;

impl Cli {
    /// Repository root selected by `--repo`, `--source` or the configured default
    pub fn source_root(&self, config: &Config) -> PathBuf {
        if let Some(ref repo) = self.repo {
            return repo.clone();
        }

        let name = self
            .source
            .as_deref()
            .unwrap_or(&config.cdn.default_source);
        config.cdn.source_root(name)
    }
}

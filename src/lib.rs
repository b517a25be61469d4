//! podcdn - local mirror for CDN-hosted pod spec repositories
//!
//! Keeps a local copy of a static spec repository warm with ETag
//! revalidation and answers pod, version and specification queries from it.

pub mod cdn;
pub mod cli;
pub mod config;
pub mod error;
pub mod ui;

pub use error::{CdnError, CdnResult};

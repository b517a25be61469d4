//! CDN-backed spec repository
//!
//! A CDN source mirrors a static file tree into a local repository root and
//! answers catalog queries from it. Remote files are only ever fetched
//! through [`ConditionalFetcher`], which revalidates cached copies with their
//! ETag and trusts anything already refreshed during the current run.

pub mod fetcher;
pub mod freshness;
pub mod http;
pub mod index;
pub mod prefetch;
pub mod source;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::{ConditionalFetcher, FetchOutcome};
pub use freshness::FreshnessTracker;
pub use http::{ConditionalHeaders, HttpClient, HttpResponse, UreqClient};
pub use index::{CatalogIndex, PodEntry};
pub use prefetch::{PrefetchHandle, PrefetchScheduler};
pub use source::{CdnSource, RefreshSummary, SourceKind, SourceOptions};
pub use version::PodVersion;

//! Conditional fetch of single remote files into the local mirror
//!
//! Every cached file may carry an ETag sidecar (`<name>.etag` next to
//! `<name>.<ext>`). A fetch sends it as `If-None-Match`; a 304 only bumps the
//! file's mtime, a 200 replaces the contents. Replacements go through a
//! temporary file renamed over the target, so a path never holds a partial body.

use crate::cdn::freshness::FreshnessTracker;
use crate::cdn::http::{ConditionalHeaders, HttpClient};
use crate::error::{CdnError, CdnResult};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::task;
use tracing::debug;

/// What `ensure_fresh` did for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Already refreshed during this run; no request made
    Fresh,
    /// Server sent new contents (200)
    Fetched,
    /// Server confirmed the cached copy (304)
    Revalidated,
    /// Server has no such file (404); local state untouched
    NotFound,
}

impl FetchOutcome {
    /// Whether a request went over the network
    pub fn hit_network(&self) -> bool {
        !matches!(self, Self::Fresh)
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh"),
            Self::Fetched => write!(f, "fetched"),
            Self::Revalidated => write!(f, "revalidated"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}

/// Keeps local copies of remote files current
pub struct ConditionalFetcher {
    root: PathBuf,
    base_url: String,
    client: Arc<dyn HttpClient>,
    freshness: FreshnessTracker,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ConditionalFetcher {
    /// Create a fetcher mirroring `base_url` into `root`
    pub fn new(
        root: impl Into<PathBuf>,
        base_url: &str,
        client: Arc<dyn HttpClient>,
        freshness: FreshnessTracker,
    ) -> Self {
        Self {
            root: root.into(),
            base_url: normalize_base_url(base_url),
            client,
            freshness,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Repository root the fetcher writes into
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Base URL, always ending in `/`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Freshness tracker shared with the owning source
    pub fn freshness(&self) -> &FreshnessTracker {
        &self.freshness
    }

    /// Local path for a repository-relative path
    pub fn local_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Make sure the local copy of `relative` is current.
    ///
    /// Concurrent calls for the same path are serialized; the later caller
    /// normally finds the file fresh and skips the request.
    pub async fn ensure_fresh(&self, relative: &str) -> CdnResult<FetchOutcome> {
        validate_relative(relative)?;
        let path = self.local_path(relative);

        if self.freshness.is_fresh(&path).await {
            debug!("CDN: {} modified during this run, using local copy", relative);
            return Ok(FetchOutcome::Fresh);
        }

        let lock = self.path_lock(relative);
        let _guard = lock.lock().await;

        if self.freshness.is_fresh(&path).await {
            debug!("CDN: {} refreshed by a concurrent request", relative);
            return Ok(FetchOutcome::Fresh);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CdnError::io(format!("creating directory {}", parent.display()), e))?;
        }

        let etag_path = etag_path(&path);
        let cached = fs::try_exists(&path)
            .await
            .map_err(|e| CdnError::io(format!("checking {}", path.display()), e))?;
        let etag = if cached {
            read_etag(&etag_path).await?
        } else {
            None
        };
        if let Some(ref etag) = etag {
            debug!("CDN: {} has ETag {}", relative, etag);
        }

        let url = format!("{}{}", self.base_url, relative);
        let response = self
            .client
            .get(&url, &ConditionalHeaders::with_etag(etag))
            .await?;

        match response.status {
            304 => {
                touch(&path).await?;
                debug!("CDN: {} not modified", relative);
                Ok(FetchOutcome::Revalidated)
            }
            200 => {
                write_atomic(&path, response.body).await?;
                if let Some(ref etag) = response.etag {
                    write_atomic(&etag_path, etag.clone().into_bytes()).await?;
                }
                debug!(
                    "CDN: {} downloaded, saved ETag: {:?}",
                    relative, response.etag
                );
                Ok(FetchOutcome::Fetched)
            }
            404 => {
                debug!("CDN: {} not found on the CDN", relative);
                Ok(FetchOutcome::NotFound)
            }
            status => Err(CdnError::HttpStatus { url, status }),
        }
    }

    fn path_lock(&self, relative: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(in_flight.entry(relative.to_string()).or_default())
    }
}

impl fmt::Debug for ConditionalFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalFetcher")
            .field("root", &self.root)
            .field("base_url", &self.base_url)
            .field("freshness", &self.freshness)
            .finish_non_exhaustive()
    }
}

/// Trim whitespace and make the URL end with exactly one `/`
pub fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}

/// Sidecar holding the ETag for a cached file
pub fn etag_path(path: &Path) -> PathBuf {
    path.with_extension("etag")
}

/// Reject paths that could escape the repository root
pub(crate) fn validate_relative(relative: &str) -> CdnResult<()> {
    let invalid = |reason: &str| CdnError::PathInvalid {
        path: relative.to_string(),
        reason: reason.to_string(),
    };

    if relative.is_empty() {
        return Err(invalid("path is empty"));
    }
    if !Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(invalid("must be relative and must not contain '.' or '..'"));
    }
    Ok(())
}

async fn read_etag(etag_path: &Path) -> CdnResult<Option<String>> {
    match fs::read_to_string(etag_path).await {
        Ok(etag) => {
            let etag = etag.trim();
            Ok((!etag.is_empty()).then(|| etag.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CdnError::io(format!("reading {}", etag_path.display()), e)),
    }
}

/// Set mtime to now so the freshness check short-circuits for the rest of the run
async fn touch(path: &Path) -> CdnResult<()> {
    let file = fs::OpenOptions::new()
        .write(true)
        .open(path)
        .await
        .map_err(|e| CdnError::io(format!("touching {}", path.display()), e))?
        .into_std()
        .await;
    let context = format!("touching {}", path.display());

    task::spawn_blocking(move || file.set_modified(SystemTime::now()))
        .await
        .map_err(|e| CdnError::Internal(format!("{}: {}", context, e)))?
        .map_err(|e| CdnError::io(context, e))
}

/// Replace `path` with `contents` in one rename.
///
/// The file only appears under its final name once fully written, with an
/// mtime of now.
async fn write_atomic(path: &Path, contents: Vec<u8>) -> CdnResult<()> {
    let path = path.to_path_buf();
    task::spawn_blocking(move || -> CdnResult<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let context = || format!("writing {}", path.display());

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| CdnError::io(context(), e))?;
        temp.write_all(&contents)
            .and_then(|_| temp.as_file().set_modified(SystemTime::now()))
            .map_err(|e| CdnError::io(context(), e))?;
        temp.persist(&path)
            .map_err(|e| CdnError::io(context(), e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| CdnError::Internal(format!("writing task failed: {}", e)))?
}

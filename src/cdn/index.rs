//! Catalog queries on top of the conditional fetcher
//!
//! The CDN cannot list directories, so listings come from published index
//! files: `all_pods.txt` for pod names and `Specs/<pod>/index.txt` for the
//! version directories of one pod.

use crate::cdn::fetcher::{ConditionalFetcher, FetchOutcome};
use crate::cdn::prefetch::{PrefetchHandle, PrefetchScheduler};
use crate::cdn::version::PodVersion;
use crate::error::{CdnError, CdnResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs;
use tracing::debug;

/// Top-level index of every pod name
pub const ALL_PODS_INDEX: &str = "all_pods.txt";

/// Directory holding the mirrored catalog
pub const SPECS_DIR: &str = "Specs";

/// Per-pod version index file name
pub const INDEX_FILE_NAME: &str = "index.txt";

type VersionSlot = Arc<tokio::sync::Mutex<Option<Vec<PodVersion>>>>;

/// A pod found by name search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodEntry {
    /// Canonical pod name, as declared by its newest specification
    pub name: String,
    /// Known versions, highest first
    pub versions: Vec<PodVersion>,
}

impl PodEntry {
    /// Highest known version
    pub fn highest_version(&self) -> Option<&PodVersion> {
        self.versions.first()
    }
}

/// The only part of a specification the catalog reads
#[derive(Debug, Deserialize)]
struct SpecificationHeader {
    name: String,
}

/// Pod, version and specification lookups for one repository
#[derive(Debug)]
pub struct CatalogIndex {
    fetcher: Arc<ConditionalFetcher>,
    scheduler: PrefetchScheduler,
    versions: Mutex<HashMap<String, VersionSlot>>,
}

impl CatalogIndex {
    /// Create an index over a fetcher, prefetching through `scheduler`
    pub fn new(fetcher: Arc<ConditionalFetcher>, scheduler: PrefetchScheduler) -> Self {
        Self {
            fetcher,
            scheduler,
            versions: Mutex::new(HashMap::new()),
        }
    }

    /// All pod names, in index order
    pub async fn list_pods(&self) -> CdnResult<Vec<String>> {
        self.fetcher.ensure_fresh(ALL_PODS_INDEX).await?;
        let path = self.fetcher.local_path(ALL_PODS_INDEX);
        if !exists(&path).await? {
            return Err(CdnError::IndexNotFound(path));
        }

        read_index(&path).await
    }

    /// Versions of `pod`, highest first, or `None` if the pod is unknown.
    ///
    /// Resolved at most once per pod for the lifetime of the index. Missing
    /// specification files are prefetched before returning.
    pub async fn list_versions(&self, pod: &str) -> CdnResult<Option<Vec<PodVersion>>> {
        if pod.is_empty() {
            return Err(CdnError::invalid_argument("pod name must not be empty"));
        }

        let slot = self.version_slot(pod);
        let mut cached = slot.lock().await;
        if let Some(ref versions) = *cached {
            return Ok(Some(versions.clone()));
        }

        let index_relative = version_index_path(pod);
        self.fetcher.ensure_fresh(&index_relative).await?;
        let index_path = self.fetcher.local_path(&index_relative);
        if !exists(&index_path).await? {
            debug!("CDN: no version index for {}", pod);
            drop(cached);
            self.forget_slot(pod, &slot);
            return Ok(None);
        }

        let contents = read_to_string(&index_path).await?;
        let mut versions = parse_version_index(pod, &contents)?;

        let mut handles = Vec::new();
        for version in &versions {
            if let Some(handle) = self.prefetch_missing_spec(pod, version).await? {
                handles.push(handle);
            }
        }
        if !handles.is_empty() {
            debug!("CDN: prefetching {} specification(s) of {}", handles.len(), pod);
        }
        PrefetchScheduler::await_all(handles).await?;

        versions.sort_by(|a, b| b.cmp(a));
        // `1.0` and `1.0.0` compare equal; keep the first listed
        versions.dedup();
        *cached = Some(versions.clone());
        Ok(Some(versions))
    }

    /// Local path of a specification, revalidated against the CDN
    pub async fn resolve_spec_path(&self, pod: &str, version: &str) -> CdnResult<PathBuf> {
        if pod.is_empty() {
            return Err(CdnError::invalid_argument("pod name must not be empty"));
        }
        if version.is_empty() {
            return Err(CdnError::invalid_argument("version must not be empty"));
        }

        let relative = spec_path(pod, version);
        let outcome = self.fetcher.ensure_fresh(&relative).await?;
        let path = self.fetcher.local_path(&relative);

        if outcome == FetchOutcome::NotFound && !exists(&path).await? {
            return Err(CdnError::SpecificationNotFound {
                pod: pod.to_string(),
                version: version.to_string(),
            });
        }
        Ok(path)
    }

    /// Look up a pod by name; subspec queries (`Pod/Subspec`) resolve to their pod.
    ///
    /// Returns `None` unless the newest specification declares exactly the
    /// queried name.
    pub async fn find_pod(&self, query: &str) -> CdnResult<Option<PodEntry>> {
        let name = root_name(query);
        if name.is_empty() {
            return Err(CdnError::invalid_argument("search query must not be empty"));
        }

        let versions = match self.list_versions(name).await? {
            Some(versions) if !versions.is_empty() => versions,
            _ => return Ok(None),
        };

        let spec = self
            .resolve_spec_path(name, versions[0].as_str())
            .await?;
        let declared = read_spec_name(&spec).await?;
        if declared != name {
            debug!("CDN: {} resolved to a spec named {}, ignoring", query, declared);
            return Ok(None);
        }

        Ok(Some(PodEntry {
            name: declared,
            versions,
        }))
    }

    async fn prefetch_missing_spec(
        &self,
        pod: &str,
        version: &PodVersion,
    ) -> CdnResult<Option<PrefetchHandle>> {
        let relative = spec_path(pod, version.as_str());
        if exists(&self.fetcher.local_path(&relative)).await? {
            return Ok(None);
        }

        let fetcher = Arc::clone(&self.fetcher);
        let label = relative.clone();
        Ok(Some(self.scheduler.submit(label, async move {
            fetcher.ensure_fresh(&relative).await.map(|_| ())
        })))
    }

    fn version_slot(&self, pod: &str) -> VersionSlot {
        let mut versions = self
            .versions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(versions.entry(pod.to_string()).or_default())
    }

    /// Drop the slot of a pod that resolved to nothing
    fn forget_slot(&self, pod: &str, slot: &VersionSlot) {
        let mut versions = self
            .versions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if versions.get(pod).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            versions.remove(pod);
        }
    }
}

/// `Specs/<pod>/index.txt`
pub fn version_index_path(pod: &str) -> String {
    format!("{}/{}/{}", SPECS_DIR, pod, INDEX_FILE_NAME)
}

/// `Specs/<pod>/<version>/<pod>.podspec.json`
pub fn spec_path(pod: &str, version: &str) -> String {
    format!("{}/{}/{}/{}.podspec.json", SPECS_DIR, pod, version, pod)
}

/// The pod part of a possibly subspec-qualified name
pub fn root_name(query: &str) -> &str {
    query.split('/').next().unwrap_or_default().trim()
}

/// Parse a version index, skipping hidden entries and blank lines
fn parse_version_index(pod: &str, contents: &str) -> CdnResult<Vec<PodVersion>> {
    contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|entry| !entry.trim().is_empty() && !entry.starts_with('.'))
        .map(|entry| {
            PodVersion::parse(entry).map_err(|_| CdnError::UnexpectedVersionEntry {
                pod: pod.to_string(),
                entry: entry.to_string(),
            })
        })
        .collect()
}

async fn exists(path: &Path) -> CdnResult<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| CdnError::io(format!("checking {}", path.display()), e))
}

async fn read_to_string(path: &Path) -> CdnResult<String> {
    fs::read_to_string(path)
        .await
        .map_err(|e| CdnError::io(format!("reading {}", path.display()), e))
}

async fn read_index(path: &Path) -> CdnResult<Vec<String>> {
    let contents = read_to_string(path).await?;
    Ok(contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

async fn read_spec_name(path: &Path) -> CdnResult<String> {
    let contents = read_to_string(path).await?;
    let header: SpecificationHeader =
        serde_json::from_str(&contents).map_err(|e| CdnError::SpecificationInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(header.name)
}

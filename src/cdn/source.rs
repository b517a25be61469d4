//! Repository source facade
//!
//! `CdnSource` is what the rest of the program talks to. It owns the run's
//! freshness tracker, the fetcher, the prefetch pool and the catalog index
//! for one repository root.

use crate::cdn::fetcher::{self, ConditionalFetcher, FetchOutcome};
use crate::cdn::freshness::FreshnessTracker;
use crate::cdn::http::HttpClient;
use crate::cdn::index::{CatalogIndex, PodEntry, SPECS_DIR};
use crate::cdn::prefetch::{PrefetchScheduler, MAX_WORKERS};
use crate::cdn::version::PodVersion;
use crate::error::{CdnError, CdnResult};
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File holding the remote base URL
pub const URL_FILE: &str = ".url";

/// Version marker fetched when a source is first refreshed
pub const VERSION_MARKER: &str = "CocoaPods-version.yml";

/// Deprecated specification paths, used as a warm-up hint
pub const DEPRECATED_PODSPECS: &str = "deprecated_podspecs.txt";

/// Kind of repository source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Static files served over HTTP
    Cdn,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cdn => write!(f, "CDN"),
        }
    }
}

/// Tuning knobs for a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    /// Concurrent prefetches (clamped to 1..=200)
    pub max_workers: usize,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            max_workers: MAX_WORKERS,
        }
    }
}

/// Result of a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    /// How the version marker was obtained on first refresh
    pub marker: FetchOutcome,
    /// Cached files revalidated by the warm-up
    pub warmed: usize,
}

/// A CDN-backed spec repository rooted at a local directory
#[derive(Debug)]
pub struct CdnSource {
    name: String,
    root: PathBuf,
    fetcher: Arc<ConditionalFetcher>,
    scheduler: PrefetchScheduler,
    index: CatalogIndex,
    initialized: OnceCell<FetchOutcome>,
}

impl CdnSource {
    /// Open the source at `root`, reading its base URL from `.url`
    pub fn open(
        root: impl Into<PathBuf>,
        client: Arc<dyn HttpClient>,
        options: SourceOptions,
    ) -> CdnResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CdnError::SourceNotFound(root));
        }

        let url_path = root.join(URL_FILE);
        let url = match std::fs::read_to_string(&url_path) {
            Ok(url) => url,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CdnError::UrlFileMissing(root));
            }
            Err(e) => return Err(CdnError::io(format!("reading {}", url_path.display()), e)),
        };
        if url.trim().is_empty() {
            return Err(CdnError::InvalidUrl(url));
        }

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        let fetcher = Arc::new(ConditionalFetcher::new(
            root.clone(),
            &url,
            client,
            FreshnessTracker::new(),
        ));
        let scheduler = PrefetchScheduler::new(options.max_workers);
        let index = CatalogIndex::new(Arc::clone(&fetcher), scheduler.clone());

        debug!(
            "Opened CDN source {} at {} ({} workers)",
            name,
            fetcher.base_url(),
            scheduler.workers()
        );

        Ok(Self {
            name,
            root,
            fetcher,
            scheduler,
            index,
            initialized: OnceCell::new(),
        })
    }

    /// Create a new source directory pointing at `url`
    pub async fn create(root: &Path, url: &str, force: bool) -> CdnResult<()> {
        let url = url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(CdnError::InvalidUrl(url.to_string()));
        }

        let url_path = root.join(URL_FILE);
        let exists = fs::try_exists(&url_path)
            .await
            .map_err(|e| CdnError::io(format!("checking {}", url_path.display()), e))?;
        if exists && !force {
            return Err(CdnError::SourceExists(root.to_path_buf()));
        }

        fs::create_dir_all(root)
            .await
            .map_err(|e| CdnError::io(format!("creating {}", root.display()), e))?;
        fs::write(&url_path, fetcher::normalize_base_url(url))
            .await
            .map_err(|e| CdnError::io(format!("writing {}", url_path.display()), e))?;

        info!("Created source {} -> {}", root.display(), url);
        Ok(())
    }

    /// Directory name of the repository root
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remote base URL, ending in `/`
    pub fn url(&self) -> &str {
        self.fetcher.base_url()
    }

    /// Local repository root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind(&self) -> SourceKind {
        SourceKind::Cdn
    }

    pub fn is_git(&self) -> bool {
        false
    }

    /// CDN sources cannot be enumerated, so they are never search-indexed
    pub fn is_indexable(&self) -> bool {
        false
    }

    /// Prefetch pool shared by this source
    pub fn scheduler(&self) -> &PrefetchScheduler {
        &self.scheduler
    }

    /// When the version marker was last revalidated, if ever
    pub fn last_refreshed(&self) -> Option<DateTime<Local>> {
        std::fs::metadata(self.root.join(VERSION_MARKER))
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Local>::from)
    }

    /// All pod names
    pub async fn pods(&self) -> CdnResult<Vec<String>> {
        self.index.list_pods().await
    }

    /// Versions of `pod`, highest first
    pub async fn versions(&self, pod: &str) -> CdnResult<Option<Vec<PodVersion>>> {
        self.index.list_versions(pod).await
    }

    /// Local path of a specification, revalidated first
    pub async fn specification_path(&self, pod: &str, version: &str) -> CdnResult<PathBuf> {
        self.index.resolve_spec_path(pod, version).await
    }

    /// Find a pod by name
    pub async fn search(&self, query: &str) -> CdnResult<Option<PodEntry>> {
        self.index.find_pod(query).await
    }

    pub fn all_specifications(&self) -> CdnResult<Vec<PathBuf>> {
        Err(CdnError::Unsupported {
            operation: "enumerate all specifications",
            reason: "the CDN does not support directory listing",
        })
    }

    pub fn search_by_full_text(&self, _query: &str) -> CdnResult<Vec<PodEntry>> {
        Err(CdnError::Unsupported {
            operation: "search by full text",
            reason: "the full catalog is never downloaded",
        })
    }

    /// Reports changed specifications; always none since every read revalidates
    pub async fn update(&self) -> CdnResult<Vec<PathBuf>> {
        debug!("CDN source {} is updated on demand", self.name);
        Ok(Vec::new())
    }

    /// Prepare the repository on first use, then revalidate cached indexes
    pub async fn refresh(&self) -> CdnResult<RefreshSummary> {
        let marker = *self
            .initialized
            .get_or_try_init(|| self.initialize())
            .await?;
        let warmed = self.warm_up().await?;

        Ok(RefreshSummary { marker, warmed })
    }

    /// Revalidate every cached index file and deprecated specification.
    ///
    /// Returns the number of files checked.
    pub async fn warm_up(&self) -> CdnResult<usize> {
        self.fetcher.ensure_fresh(DEPRECATED_PODSPECS).await?;

        let mut candidates = self.local_index_files().await?;
        candidates.extend(self.deprecated_specs().await?);

        let handles = candidates
            .into_iter()
            .map(|relative| {
                let fetcher = Arc::clone(&self.fetcher);
                let label = relative.clone();
                self.scheduler.submit(label, async move {
                    fetcher.ensure_fresh(&relative).await.map(|_| ())
                })
            })
            .collect::<Vec<_>>();

        let count = handles.len();
        PrefetchScheduler::await_all(handles).await?;
        info!("Warmed {} cached file(s) for {}", count, self.name);
        Ok(count)
    }

    async fn initialize(&self) -> CdnResult<FetchOutcome> {
        if !self.root.is_dir() {
            return Err(CdnError::SourceNotFound(self.root.clone()));
        }

        let specs = self.root.join(SPECS_DIR);
        fs::create_dir_all(&specs)
            .await
            .map_err(|e| CdnError::io(format!("creating {}", specs.display()), e))?;

        let outcome = self.fetcher.ensure_fresh(VERSION_MARKER).await?;
        info!("{}: version marker {}", self.name, outcome);
        Ok(outcome)
    }

    /// Relative paths of cached `*.txt` and `*.yml` files
    async fn local_index_files(&self) -> CdnResult<BTreeSet<String>> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || collect_index_files(&root))
            .await
            .map_err(|e| CdnError::Internal(format!("scanning repository failed: {}", e)))?
    }

    /// Deprecated specification paths that are cached locally
    async fn deprecated_specs(&self) -> CdnResult<Vec<String>> {
        let path = self.fetcher.local_path(DEPRECATED_PODSPECS);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CdnError::io(format!("reading {}", path.display()), e)),
        };

        Ok(contents
            .split_whitespace()
            .filter(|entry| match fetcher::validate_relative(entry) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Skipping deprecated entry: {}", e);
                    false
                }
            })
            .filter(|entry| self.fetcher.local_path(entry).is_file())
            .map(str::to_string)
            .collect())
    }
}

fn collect_index_files(root: &Path) -> CdnResult<BTreeSet<String>> {
    let mut files = BTreeSet::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| {
            let context = format!("scanning {}", root.display());
            match e.into_io_error() {
                Some(io) => CdnError::io(context, io),
                None => CdnError::Internal(context),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let is_index = matches!(
            entry.path().extension().and_then(|e| e.to_str()),
            Some("txt") | Some("yml")
        );
        if !is_index {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if relative != DEPRECATED_PODSPECS {
            files.insert(relative);
        }
    }

    Ok(files)
}

//! Error types for podcdn
//!
//! All modules use `CdnResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for podcdn operations
pub type CdnResult<T> = Result<T, CdnError>;

/// All errors that can occur in podcdn
#[derive(Error, Debug)]
pub enum CdnError {
    // Source errors
    #[error("Unable to find a source at {0}")]
    SourceNotFound(PathBuf),

    #[error("Source at {0} has no .url file")]
    UrlFileMissing(PathBuf),

    #[error("Invalid CDN URL: {0:?}")]
    InvalidUrl(String),

    #[error("Source already exists: {0}")]
    SourceExists(PathBuf),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: String, reason: String },

    // Catalog data errors
    #[error(
        "An unexpected version directory `{entry}` was encountered for the `{pod}` Pod"
    )]
    UnexpectedVersionEntry { pod: String, entry: String },

    #[error("Invalid version identifier: {0:?}")]
    InvalidVersion(String),

    #[error("Index file not available: {0}")]
    IndexNotFound(PathBuf),

    #[error("No specification for {pod} ({version})")]
    SpecificationNotFound { pod: String, version: String },

    #[error("Malformed specification {path}: {reason}")]
    SpecificationInvalid { path: PathBuf, reason: String },

    // Unsupported operations
    #[error("Can't {operation} on a CDN source: {reason}")]
    Unsupported {
        operation: &'static str,
        reason: &'static str,
    },

    // Transport errors
    #[error("Request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    // Prefetch errors
    #[error("Prefetch task panicked: {label}")]
    PrefetchPanicked { label: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl CdnError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Check if error is retryable
    ///
    /// Nothing in podcdn retries on its own; this only classifies failures
    /// for callers that want to.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::SourceNotFound(_) => Some("Run: podcdn add <name> <url>"),
            Self::UrlFileMissing(_) => Some("Re-create the source with: podcdn add --force <name> <url>"),
            Self::IndexNotFound(_) => Some("Run: podcdn refresh"),
            Self::Unsupported { .. } => Some("Query pods by name instead"),
            Self::HttpStatus { status, .. } if *status >= 500 => {
                Some("The CDN reported a server error; try again later")
            }
            _ => None,
        }
    }
}

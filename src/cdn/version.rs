//! Pod version identifiers
//!
//! Version directories are named like `1.2.3`, `2.0`, `1.2.3.4` or
//! `3.0.0-beta.2`. Numeric segments compare with zero padding, pre-release
//! tags follow semver precedence, `+build` metadata is accepted and ignored.

use crate::error::{CdnError, CdnResult};
use semver::{BuildMetadata, Prerelease};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed version directory name
#[derive(Debug, Clone)]
pub struct PodVersion {
    raw: String,
    segments: Vec<u64>,
    pre: Prerelease,
}

impl PodVersion {
    /// Parse a version directory name
    pub fn parse(s: &str) -> CdnResult<Self> {
        let raw = s.trim();
        let invalid = || CdnError::InvalidVersion(s.to_string());

        if raw.is_empty() {
            return Err(invalid());
        }

        let rest = match raw.split_once('+') {
            Some((rest, build)) => {
                if build.is_empty() {
                    return Err(invalid());
                }
                BuildMetadata::new(build).map_err(|_| invalid())?;
                rest
            }
            None => raw,
        };

        let (numbers, pre) = match rest.split_once('-') {
            Some((numbers, pre)) => {
                if pre.is_empty() {
                    return Err(invalid());
                }
                (numbers, Prerelease::new(pre).map_err(|_| invalid())?)
            }
            None => (rest, Prerelease::EMPTY),
        };

        let segments = numbers
            .split('.')
            .map(|segment| {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                segment.parse::<u64>().map_err(|_| invalid())
            })
            .collect::<CdnResult<Vec<_>>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
            pre,
        })
    }

    /// The directory name this version was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric release segments
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Whether this is a pre-release
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl Ord for PodVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.pre.cmp(&other.pre)
    }
}

impl PartialOrd for PodVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PodVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PodVersion {}

impl fmt::Display for PodVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for PodVersion {
    type Err = CdnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PodVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

//! Version parsing and latest-release selection.
//!
//! Release tags look like `v1.2.3`. Selection compares versions numerically,
//! so `v1.10.0` is newer than `v1.2.0`.

use crate::error::{Error, Result};
use crate::process::{CommandRunner, ToolCommand};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    /// Major version number.
    pub major: u64,
    /// Minor version number.
    pub minor: u64,
    /// Patch version number.
    pub patch: u64,
    /// Pre-release identifier (e.g., "alpha", "beta.1").
    pub prerelease: Option<String>,
    /// Build metadata (e.g., "20230101", "commit.abc123").
    pub build: Option<String>,
}

impl Version {
    /// Create a new version.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Create a version with a pre-release identifier.
    #[must_use]
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    /// The release tag for this version, e.g. `v1.2.3`.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("v{self}")
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);

        let (version_pre, build) = match s.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (s, None),
        };

        let (version, prerelease) = match version_pre.split_once('-') {
            Some((v, p)) => (v, Some(p.to_string())),
            None => (version_pre, None),
        };

        let parts: Vec<&str> = version.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(Error::invalid_version(s));
        };

        let parse = |part: &str, what: &str| {
            part.parse::<u64>()
                .map_err(|_| Error::invalid_version(format!("Invalid {what} version: {part}")))
        };

        Ok(Self {
            major: parse(major, "major")?,
            minor: parse(minor, "minor")?,
            patch: parse(patch, "patch")?,
            prerelease,
            build,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{pre}")?;
        }
        if let Some(ref build) = self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            // Pre-release versions have lower precedence
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
        // Build metadata is ignored in comparison
    }
}

/// Picks the greatest version among `tags`.
///
/// Tags that do not parse as versions are skipped.
#[must_use]
pub fn latest_version<'a, I>(tags: I) -> Option<Version>
where
    I: IntoIterator<Item = &'a str>,
{
    tags.into_iter()
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .filter_map(|tag| match tag.parse::<Version>() {
            Ok(version) => Some(version),
            Err(e) => {
                debug!(tag, error = %e, "Skipping non-version tag");
                None
            }
        })
        .max()
}

/// Lists git tags in the current repository and picks the latest version.
///
/// # Errors
///
/// Returns an error if `git tag -l` fails or no tag parses as a version.
pub async fn latest_tag_version(runner: &dyn CommandRunner) -> Result<Version> {
    let output = runner.output(&ToolCommand::new("git", ["tag", "-l"])).await?;

    latest_version(output.lines()).ok_or_else(|| {
        Error::configuration(
            "No version tags found in this repository",
            "Pass --version explicitly or push a tag like v1.0.0",
        )
    })
}

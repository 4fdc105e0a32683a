//! Build context resolved from the CI environment.
//!
//! The context is read once at process start and passed by reference to every
//! pipeline step. Missing publishing inputs never fail the run; they fall back
//! to placeholders and switch the run to dry-run instead.

use crate::artifact::Target;
use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Placeholder registry owner used when `GITHUB_REPOSITORY_OWNER` is unset.
pub const PLACEHOLDER_OWNER: &str = "pkgowner";
/// Placeholder package name used when `GITHUB_REPOSITORY` is unset.
pub const PLACEHOLDER_PACKAGE: &str = "pkgname";
/// Placeholder server URL used when `GITHUB_SERVER_URL` is unset.
pub const PLACEHOLDER_SERVER_URL: &str = "https://example.com";
/// Placeholder token used when no registry token is available.
pub const PLACEHOLDER_TOKEN: &str = "placeholder_token";
/// Placeholder tag used when the run was not triggered by a tag push.
pub const PLACEHOLDER_TAG: &str = "vX.Y.Z";

/// Environment variables consulted for the registry token, in order.
pub const TOKEN_VARS: &[&str] = &["FORGEJO_READWRITE_TOKEN", "GITHUB_TOKEN"];

/// Whether a run may perform publish side effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DryRun {
    /// Publish for real.
    #[default]
    No,
    /// Log what would be published and send nothing.
    Yes,
}

impl DryRun {
    /// Returns true for [`DryRun::Yes`].
    #[must_use]
    pub const fn is_dry_run(self) -> bool {
        matches!(self, Self::Yes)
    }

    /// Switches to dry-run when `condition` holds. Never switches back.
    #[must_use]
    pub const fn force_if(self, condition: bool) -> Self {
        if condition { Self::Yes } else { self }
    }
}

/// Registry authentication token.
///
/// `Debug` output is redacted so the context can be logged freely.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for use in request headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the first and last two characters, e.g. `ab...yz`.
    #[must_use]
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 4 {
            return "****".to_string();
        }
        let head: String = chars[..2].iter().collect();
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiToken({})", self.masked())
    }
}

/// Immutable configuration for one build-and-publish run.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Cargo target directory (`CARGO_TARGET_DIR`).
    pub target_dir: PathBuf,
    /// Platform being built (`ARCH`).
    pub target: Target,
    /// Name of the produced binary (`BINARY_NAME`).
    pub binary_name: String,
    /// Registry owner.
    pub owner: String,
    /// Package name in the registry (the repository name).
    pub package_name: String,
    /// Base URL of the registry server.
    pub server_url: String,
    /// Registry token.
    pub token: ApiToken,
    /// Release tag the artifact is published under.
    pub tag: String,
    /// Whether the publish step is skipped.
    pub dry_run: DryRun,
}

impl BuildContext {
    /// Resolves the context from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a required variable is missing or
    /// `ARCH` is not a supported target.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the context from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `CARGO_TARGET_DIR`, `ARCH` or
    /// `BINARY_NAME` is missing, or if `ARCH` is not a supported target.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                Error::configuration(
                    format!("{key} is not set"),
                    format!("export {key}=<value> before running the release"),
                )
            })
        };

        let target_dir = PathBuf::from(required("CARGO_TARGET_DIR")?);
        let target: Target = required("ARCH")?.parse()?;
        let binary_name = required("BINARY_NAME")?;

        info!(binary = %binary_name, "Binary name");
        info!(arch = %target, "Architecture");

        let mut dry_run = DryRun::No;

        let owner = with_placeholder(
            get("GITHUB_REPOSITORY_OWNER"),
            PLACEHOLDER_OWNER,
            "package owner",
            &mut dry_run,
        );
        info!(owner = %owner, "Package owner");

        let package_name = with_placeholder(
            get("GITHUB_REPOSITORY").and_then(|repo| repo_name(&repo)),
            PLACEHOLDER_PACKAGE,
            "package name",
            &mut dry_run,
        );
        info!(package = %package_name, "Package name");

        let server_url = with_placeholder(
            get("GITHUB_SERVER_URL"),
            PLACEHOLDER_SERVER_URL,
            "server URL",
            &mut dry_run,
        );
        info!(server_url = %server_url, "Server URL");

        let token = ApiToken::new(with_placeholder(
            TOKEN_VARS.iter().find_map(|key| get(key)),
            PLACEHOLDER_TOKEN,
            "registry token",
            &mut dry_run,
        ));
        info!(token = %token.masked(), "Registry token");

        let tag = match get("GITHUB_REF").as_deref().and_then(tag_from_ref) {
            Some(tag) if tag != PLACEHOLDER_TAG => {
                info!(tag = %tag, "Processing tag");
                tag
            }
            _ => {
                dry_run = DryRun::Yes;
                warn!(tag = PLACEHOLDER_TAG, "No tag detected. Forcing dry run");
                PLACEHOLDER_TAG.to_string()
            }
        };

        Ok(Self {
            target_dir,
            target,
            binary_name,
            owner,
            package_name,
            server_url,
            token,
            tag,
            dry_run,
        })
    }

    /// Forces dry-run when `force` is set. An already dry run stays dry.
    #[must_use]
    pub fn with_forced_dry_run(mut self, force: bool) -> Self {
        self.dry_run = self.dry_run.force_if(force);
        self
    }

    /// Directory cargo writes release binaries to.
    #[must_use]
    pub fn release_dir(&self) -> PathBuf {
        self.target_dir.join("release")
    }

    /// Expected path of the built binary.
    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        self.release_dir().join(&self.binary_name)
    }

    /// Archive filename for this run's target.
    #[must_use]
    pub fn archive_name(&self) -> String {
        self.target.archive_name()
    }

    /// Registry URL an archive is uploaded to.
    ///
    /// Format: `{server}/api/packages/{owner}/generic/{package}/{tag}/{archive}`
    #[must_use]
    pub fn package_url(&self, archive_name: &str) -> String {
        format!(
            "{}/api/packages/{}/generic/{}/{}/{}",
            self.server_url.trim_end_matches('/'),
            self.owner,
            self.package_name,
            self.tag,
            archive_name
        )
    }
}

/// Uses `value` or falls back to `placeholder`.
///
/// Dry-run is forced whenever the result is the placeholder, including when
/// the variable was explicitly set to it.
fn with_placeholder(
    value: Option<String>,
    placeholder: &str,
    what: &str,
    dry_run: &mut DryRun,
) -> String {
    let value = value.unwrap_or_else(|| placeholder.to_string());
    if value == placeholder {
        *dry_run = DryRun::Yes;
        warn!(placeholder, "Using placeholder {what}. Forcing dry run");
    }
    value
}

/// Extracts the repository name from an `owner/repo` string.
fn repo_name(repository: &str) -> Option<String> {
    repository
        .split('/')
        .nth(1)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Extracts the tag from a `refs/tags/<tag>` ref.
fn tag_from_ref(git_ref: &str) -> Option<String> {
    git_ref
        .strip_prefix("refs/tags/")
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
}

//! Error types for release operations.
//!
//! Every error is terminal for the run: the CLI reports it and exits with a
//! non-zero status. Nothing here is retried.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, publishing or describing a release.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A required input is missing or invalid.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(bearsays::release::config), help("{help}"))]
    Configuration {
        /// The error message
        message: String,
        /// Help text for the operator
        help: String,
    },

    /// An external tool could not be started or exited unsuccessfully.
    #[error("Command `{command}` failed: {message}")]
    #[diagnostic(
        code(bearsays::release::toolchain),
        help("Check that the tool is installed and on PATH")
    )]
    Toolchain {
        /// The command line that failed
        command: String,
        /// Exit status or spawn failure description
        message: String,
    },

    /// The build finished but the expected binary is not where it should be.
    #[error("Binary not found at {}", path.display())]
    #[diagnostic(
        code(bearsays::release::artifact_missing),
        help("Check CARGO_TARGET_DIR and BINARY_NAME")
    )]
    ArtifactMissing {
        /// The expected binary path
        path: PathBuf,
    },

    /// Uploading to the package registry failed.
    #[error("Publish failed: {message}")]
    #[diagnostic(code(bearsays::release::publish))]
    Publish {
        /// The error message
        message: String,
        /// HTTP status returned by the registry, if a response arrived
        status: Option<u16>,
    },

    /// Downloading a published artifact failed.
    #[error("Failed to fetch {url}: {message}")]
    #[diagnostic(code(bearsays::release::fetch))]
    Fetch {
        /// The URL that was requested
        url: String,
        /// The error message
        message: String,
        /// HTTP status returned by the registry, if a response arrived
        status: Option<u16>,
    },

    /// A fetched artifact is too small to be a real build.
    #[error("Artifact at {url} is too small: {size} bytes (minimum {minimum})")]
    #[diagnostic(
        code(bearsays::release::artifact_too_small),
        help("The upload for this version is probably corrupt or a placeholder")
    )]
    ArtifactTooSmall {
        /// The URL that was fetched
        url: String,
        /// Size of the payload in bytes
        size: u64,
        /// Minimum accepted size in bytes
        minimum: u64,
    },

    /// Failed to parse a version string.
    #[error("Invalid version: {version}")]
    #[diagnostic(
        code(bearsays::release::invalid_version),
        help("Versions look like 1.2.3 or v1.2.3")
    )]
    InvalidVersion {
        /// The invalid version string
        version: String,
    },

    /// Formula template rendering left placeholders behind.
    #[error("Template error: {message}")]
    #[diagnostic(code(bearsays::release::template))]
    Template {
        /// The error message
        message: String,
    },

    /// Wrapped I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(bearsays::release::io))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a new toolchain error.
    #[must_use]
    pub fn toolchain(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Toolchain {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a new missing artifact error.
    #[must_use]
    pub fn artifact_missing(path: impl Into<PathBuf>) -> Self {
        Self::ArtifactMissing { path: path.into() }
    }

    /// Create a new publish error.
    #[must_use]
    pub fn publish(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Publish {
            message: message.into(),
            status,
        }
    }

    /// Create a new fetch error.
    #[must_use]
    pub fn fetch(url: impl Into<String>, message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
            status,
        }
    }

    /// Create a new undersized artifact error.
    #[must_use]
    pub fn artifact_too_small(url: impl Into<String>, size: u64, minimum: u64) -> Self {
        Self::ArtifactTooSmall {
            url: url.into(),
            size,
            minimum,
        }
    }

    /// Create a new invalid version error.
    #[must_use]
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a new template error.
    #[must_use]
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }
}

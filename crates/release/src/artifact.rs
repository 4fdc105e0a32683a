//! Release artifacts.
//!
//! This module handles:
//! - Target platform enumeration
//! - Archive naming
//! - SHA256 checksums of artifact payloads
//! - Human-readable byte sizes for operator logs

use crate::error::{Error, Result};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Supported build targets for binary distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    /// macOS ARM64 (Apple Silicon)
    DarwinArm64,
    /// Linux `x86_64`
    LinuxX64,
}

impl Target {
    /// Returns the Rust target triple for this target.
    #[must_use]
    pub const fn rust_triple(&self) -> &'static str {
        match self {
            Self::DarwinArm64 => "aarch64-apple-darwin",
            Self::LinuxX64 => "x86_64-unknown-linux-gnu",
        }
    }

    /// Returns all supported targets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::DarwinArm64, Self::LinuxX64]
    }

    /// Parses a target from a Rust triple.
    #[must_use]
    pub fn from_rust_triple(triple: &str) -> Option<Self> {
        match triple {
            "aarch64-apple-darwin" => Some(Self::DarwinArm64),
            "x86_64-unknown-linux-gnu" => Some(Self::LinuxX64),
            _ => None,
        }
    }

    /// Returns the archive filename for this target.
    ///
    /// Format: `{triple}.tar.xz`
    #[must_use]
    pub fn archive_name(&self) -> String {
        format!("{}.tar.xz", self.rust_triple())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rust_triple())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_rust_triple(s).ok_or_else(|| {
            let valid: Vec<_> = Self::all().iter().map(Self::rust_triple).collect();
            Error::configuration(
                format!("Unsupported architecture: {s}"),
                format!("Set ARCH to one of: {}", valid.join(", ")),
            )
        })
    }
}

/// A packaged release artifact, read back into memory for upload.
#[derive(Debug, Clone)]
pub struct PackagedArtifact {
    /// The target platform.
    pub target: Target,
    /// Path to the .tar.xz archive.
    pub archive_path: PathBuf,
    /// Name of the archive file.
    pub archive_name: String,
    /// Archive content.
    pub content: Bytes,
}

impl PackagedArtifact {
    /// Size of the archive in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Computes the SHA256 checksum of a payload as lowercase hex.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Formats a byte count with a binary unit, e.g. `1.50 MB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{value:.2} {}", UNITS[unit])
}

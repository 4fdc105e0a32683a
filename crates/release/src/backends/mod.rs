//! Release distribution backends.
//!
//! This module defines the [`ReleaseBackend`] trait the pipeline publishes
//! through, and the [`PublishResult`] it gets back.
//!
//! Implementations:
//! - [`registry::RegistryBackend`] - generic package registry upload over HTTP
//!
//! # Example
//!
//! ```rust,ignore
//! use bearsays_release::backends::{ReleaseBackend, PublishResult};
//!
//! struct MyBackend;
//!
//! impl ReleaseBackend for MyBackend {
//!     fn name(&self) -> &'static str { "my-backend" }
//!
//!     fn publish<'a>(
//!         &'a self,
//!         ctx: &'a BuildContext,
//!         artifact: &'a PackagedArtifact,
//!     ) -> Pin<Box<dyn Future<Output = Result<PublishResult>> + Send + 'a>> {
//!         Box::pin(async move {
//!             Ok(PublishResult::success("my-backend", "Published"))
//!         })
//!     }
//! }
//! ```

pub mod registry;

use crate::artifact::PackagedArtifact;
use crate::context::BuildContext;
use crate::error::Result;
use std::future::Future;
use std::pin::Pin;

/// Result of a backend publish operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    /// Name of the backend
    pub backend: String,
    /// URL the artifact was (or would have been) published to
    pub url: Option<String>,
    /// Whether nothing was actually sent
    pub dry_run: bool,
    /// Human-readable message
    pub message: String,
}

impl PublishResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            url: None,
            dry_run: false,
            message: message.into(),
        }
    }

    /// Creates a successful result with URL.
    #[must_use]
    pub fn success_with_url(
        backend: impl Into<String>,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::success(backend, message)
        }
    }

    /// Creates a dry-run result for the URL that would have been used.
    #[must_use]
    pub fn dry_run(
        backend: impl Into<String>,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            backend: backend.into(),
            url: Some(url.into()),
            dry_run: true,
            message: format!("[dry-run] {}", message.into()),
        }
    }
}

/// Trait for release distribution backends.
///
/// A backend must honour [`BuildContext::dry_run`]: when set, it logs the
/// destination and returns [`PublishResult::dry_run`] without side effects.
pub trait ReleaseBackend: Send + Sync {
    /// Returns the name of this backend.
    fn name(&self) -> &'static str;

    /// Publishes the packaged artifact.
    ///
    /// # Errors
    ///
    /// Returns a publish error if the destination rejects the artifact or
    /// cannot be reached.
    fn publish<'a>(
        &'a self,
        ctx: &'a BuildContext,
        artifact: &'a PackagedArtifact,
    ) -> Pin<Box<dyn Future<Output = Result<PublishResult>> + Send + 'a>>;
}

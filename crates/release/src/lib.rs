//! Release tooling for bearsays.
//!
//! This crate holds everything the CI release jobs need to turn a checkout
//! into a published artifact: resolving the build context from the CI
//! environment, driving the external toolchain, archiving the binary and
//! uploading it to a generic package registry.
//!
//! # Architecture
//!
//! - [`context`] - [`BuildContext`] resolved once from the environment
//! - [`process`] - the [`CommandRunner`] seam around external tools
//! - [`artifact`] - supported [`Target`]s, archives and checksums
//! - [`backends`] - the [`ReleaseBackend`] trait and the registry upload
//! - [`pipeline`] - the ordered build-and-publish steps
//! - [`version`] - version parsing and latest-tag selection
//!
//! # Example
//!
//! ```rust,ignore
//! use bearsays_release::{BuildContext, PublishPipeline, RegistryBackend, SystemRunner};
//!
//! let ctx = BuildContext::from_env()?;
//! let runner = SystemRunner::new();
//! let backend = RegistryBackend::new();
//! let report = PublishPipeline::new(&ctx, &runner, &backend).run().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod artifact;
pub mod backends;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod version;

pub use artifact::{PackagedArtifact, Target, format_bytes, sha256_hex};
pub use backends::registry::RegistryBackend;
pub use backends::{PublishResult, ReleaseBackend};
pub use context::{ApiToken, BuildContext, DryRun};
pub use error::{Error, Result};
pub use pipeline::{PipelineReport, PublishPipeline, StepTimings};
pub use process::{CommandRunner, SystemRunner, ToolCommand};
pub use version::{Version, latest_version};

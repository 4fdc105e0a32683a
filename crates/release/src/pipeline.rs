//! Build-and-publish pipeline.
//!
//! Runs the release steps for one target in order: toolchain check, build,
//! binary check, archive, read, publish, sweep. Every step must succeed before
//! the next one starts; the first error aborts the run.

use crate::artifact::{PackagedArtifact, format_bytes};
use crate::backends::{PublishResult, ReleaseBackend};
use crate::context::BuildContext;
use crate::error::{Error, Result};
use crate::process::{CommandRunner, ToolCommand};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Retention window passed to `cargo sweep --time`.
pub const SWEEP_RETENTION_DAYS: u32 = 30;

/// Wall-clock time spent in each step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepTimings {
    /// `cargo build`.
    pub build: Duration,
    /// Archive creation.
    pub archive: Duration,
    /// Reading the archive back into memory.
    pub read: Duration,
    /// Upload; `None` on a dry run.
    pub upload: Option<Duration>,
    /// `cargo sweep`.
    pub sweep: Duration,
    /// The whole run.
    pub total: Duration,
}

impl StepTimings {
    /// Logs the summary at info level.
    pub fn log_summary(&self) {
        info!(ms = self.build.as_millis(), "Build time");
        info!(ms = self.archive.as_millis(), "Archive creation time");
        info!(ms = self.read.as_millis(), "File read time");
        if let Some(upload) = self.upload {
            info!(ms = upload.as_millis(), "Upload time");
        }
        info!(ms = self.sweep.as_millis(), "Sweep time");
        info!(ms = self.total.as_millis(), "Total execution time");
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// The artifact that was built and archived.
    pub artifact: PackagedArtifact,
    /// What the backend did with it.
    pub publish: PublishResult,
    /// Step timings.
    pub timings: StepTimings,
}

/// The build-and-publish pipeline for a single target.
pub struct PublishPipeline<'a> {
    ctx: &'a BuildContext,
    runner: &'a dyn CommandRunner,
    backend: &'a dyn ReleaseBackend,
    work_dir: PathBuf,
}

impl<'a> PublishPipeline<'a> {
    /// Creates a pipeline writing the archive to the current directory.
    #[must_use]
    pub fn new(
        ctx: &'a BuildContext,
        runner: &'a dyn CommandRunner,
        backend: &'a dyn ReleaseBackend,
    ) -> Self {
        Self {
            ctx,
            runner,
            backend,
            work_dir: PathBuf::from("."),
        }
    }

    /// Sets the directory commands run in and the archive is written to.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Path of the archive this run produces.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.work_dir.join(self.ctx.archive_name())
    }

    /// Directory cargo writes release binaries to, resolved against the
    /// work directory.
    #[must_use]
    pub fn release_dir(&self) -> PathBuf {
        self.resolve(self.ctx.release_dir())
    }

    /// Expected path of the built binary, resolved against the work
    /// directory.
    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        self.resolve(self.ctx.binary_path())
    }

    // Commands run in the work directory, so a relative CARGO_TARGET_DIR
    // is relative to it too.
    fn resolve(&self, path: PathBuf) -> PathBuf {
        if path.is_relative() {
            self.work_dir.join(path)
        } else {
            path
        }
    }

    /// Runs every step in order.
    ///
    /// # Errors
    ///
    /// Returns the first step failure: a toolchain error for a failing
    /// command, an artifact-missing error if the build produced no binary,
    /// an I/O error reading the archive, or a publish error from the backend.
    pub async fn run(&self) -> Result<PipelineReport> {
        let started = Instant::now();
        let mut timings = StepTimings::default();

        info!(
            binary = %self.ctx.binary_name,
            arch = %self.ctx.target,
            dry_run = self.ctx.dry_run.is_dry_run(),
            "Starting build process"
        );

        self.check_toolchain().await?;

        let step = Instant::now();
        self.build().await?;
        timings.build = step.elapsed();
        info!(ms = timings.build.as_millis(), "Build completed successfully");

        self.verify_binary().await?;

        let step = Instant::now();
        self.archive().await?;
        timings.archive = step.elapsed();
        info!(ms = timings.archive.as_millis(), "Package archive created successfully");
        self.list_archive().await?;

        let step = Instant::now();
        let artifact = self.read_archive().await?;
        timings.read = step.elapsed();
        info!(
            ms = timings.read.as_millis(),
            size = %format_bytes(artifact.size()),
            "File content read successfully"
        );

        let step = Instant::now();
        let publish = self.backend.publish(self.ctx, &artifact).await?;
        if !publish.dry_run {
            timings.upload = Some(step.elapsed());
        }
        info!(backend = %publish.backend, message = %publish.message, "Publish step finished");

        let step = Instant::now();
        self.sweep().await?;
        timings.sweep = step.elapsed();
        info!(ms = timings.sweep.as_millis(), "Cargo sweep completed");

        timings.total = started.elapsed();
        timings.log_summary();
        info!("Build process completed successfully");

        Ok(PipelineReport {
            artifact,
            publish,
            timings,
        })
    }

    fn command<I, S>(&self, program: &str, args: I) -> ToolCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ToolCommand::new(program, args).current_dir(&self.work_dir)
    }

    async fn check_toolchain(&self) -> Result<()> {
        info!("Checking Rust toolchain versions");
        for command in [
            self.command("rustc", ["--version"]),
            self.command("cargo", ["--version"]),
            self.command("cargo", ["sweep", "--version"]),
        ] {
            self.runner.run(&command).await?;
        }
        info!("Rust toolchain versions checked");
        Ok(())
    }

    async fn build(&self) -> Result<()> {
        info!("Building the project");
        self.runner
            .run(&self.command("cargo", ["build", "--verbose", "--release"]))
            .await
    }

    async fn verify_binary(&self) -> Result<()> {
        let binary_path = self.binary_path();
        info!(path = %binary_path.display(), "Binary file path");

        match tokio::fs::metadata(&binary_path).await {
            Ok(metadata) if metadata.is_file() => {
                info!(size = %format_bytes(metadata.len()), "Binary file exists");
                Ok(())
            }
            _ => Err(Error::artifact_missing(binary_path)),
        }
    }

    async fn archive(&self) -> Result<()> {
        let archive_name = self.ctx.archive_name();
        info!(archive = %archive_name, "Creating package archive");

        let release_dir = path_arg(&self.release_dir());
        self.runner
            .run(&self.command(
                "tar",
                [
                    "-cJvf",
                    archive_name.as_str(),
                    "-C",
                    release_dir.as_str(),
                    self.ctx.binary_name.as_str(),
                ],
            ))
            .await
    }

    async fn list_archive(&self) -> Result<()> {
        info!("Showing contents of the archive");
        let archive_name = self.ctx.archive_name();
        self.runner
            .run(&self.command("tar", ["-tvf", archive_name.as_str()]))
            .await
    }

    async fn read_archive(&self) -> Result<PackagedArtifact> {
        let archive_path = self.archive_path();
        let content = tokio::fs::read(&archive_path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read {}: {e}", archive_path.display()),
            ))
        })?;

        Ok(PackagedArtifact {
            target: self.ctx.target,
            archive_name: self.ctx.archive_name(),
            archive_path,
            content: Bytes::from(content),
        })
    }

    async fn sweep(&self) -> Result<()> {
        info!(days = SWEEP_RETENTION_DAYS, "Running cargo sweep");
        let days = SWEEP_RETENTION_DAYS.to_string();
        self.runner
            .run(&self.command("cargo", ["sweep", "--time", days.as_str()]))
            .await
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

//! External command execution.
//!
//! The pipeline never spawns processes directly; it goes through a
//! [`CommandRunner`] so tests can substitute a fake and assert on the exact
//! invocations.

use crate::error::{Error, Result};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A single external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Program to run, resolved through `PATH`.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Working directory, or the current one when `None`.
    pub cwd: Option<PathBuf>,
}

impl ToolCommand {
    /// Creates a command with arguments.
    #[must_use]
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    /// Sets the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    fn to_tokio(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external commands, failing on non-zero exit.
pub trait CommandRunner: Send + Sync {
    /// Runs the command with inherited stdio.
    ///
    /// # Errors
    ///
    /// Returns a toolchain error if the command cannot be spawned or exits
    /// unsuccessfully.
    fn run<'a>(
        &'a self,
        command: &'a ToolCommand,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Runs the command and returns its captured stdout.
    ///
    /// # Errors
    ///
    /// Returns a toolchain error if the command cannot be spawned or exits
    /// unsuccessfully.
    fn output<'a>(
        &'a self,
        command: &'a ToolCommand,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// [`CommandRunner`] backed by real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Creates a new system runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run<'a>(
        &'a self,
        command: &'a ToolCommand,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            debug!(command = %command, cwd = ?command.cwd, "Running command");

            let status = command
                .to_tokio()
                .stdin(Stdio::null())
                .status()
                .await
                .map_err(|e| Error::toolchain(command.to_string(), format!("failed to start: {e}")))?;

            if !status.success() {
                return Err(Error::toolchain(
                    command.to_string(),
                    format!("process exited with {status}"),
                ));
            }

            Ok(())
        })
    }

    fn output<'a>(
        &'a self,
        command: &'a ToolCommand,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(command = %command, cwd = ?command.cwd, "Capturing command output");

            let output = command
                .to_tokio()
                .stdin(Stdio::null())
                .output()
                .await
                .map_err(|e| Error::toolchain(command.to_string(), format!("failed to start: {e}")))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(Error::toolchain(
                    command.to_string(),
                    format!("process exited with {}: {}", output.status, stderr.trim()),
                ));
            }

            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_command_display() {
        let cmd = ToolCommand::new("cargo", ["build", "--verbose", "--release"]);
        assert_eq!(cmd.to_string(), "cargo build --verbose --release");
    }

    #[test]
    fn test_tool_command_current_dir() {
        let cmd = ToolCommand::new("tar", ["-tvf", "a.tar.xz"]).current_dir("/tmp/work");
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp/work")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_success() {
        let runner = SystemRunner::new();
        runner.run(&ToolCommand::new("true", Vec::<String>::new())).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_non_zero_exit() {
        let runner = SystemRunner::new();
        let err = runner
            .run(&ToolCommand::new("false", Vec::<String>::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Toolchain { .. }));
    }

    #[tokio::test]
    async fn test_system_runner_missing_program() {
        let runner = SystemRunner::new();
        let err = runner
            .run(&ToolCommand::new(
                "bearsays-definitely-not-a-real-program",
                ["--version"],
            ))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_output() {
        let runner = SystemRunner::new();
        let out = runner
            .output(&ToolCommand::new("echo", ["v1.0.0"]))
            .await
            .unwrap();
        assert_eq!(out.trim(), "v1.0.0");
    }
}

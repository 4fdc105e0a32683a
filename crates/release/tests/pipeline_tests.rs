//! End-to-end tests for the build-and-publish pipeline with a fake toolchain.

use bearsays_release::{
    BuildContext, CommandRunner, Error, PublishPipeline, RegistryBackend, Result, ToolCommand,
};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Mutex;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records invocations and simulates `tar -c` by writing the archive file.
#[derive(Default)]
struct FakeRunner {
    calls: Mutex<Vec<ToolCommand>>,
    fail_on: Option<&'static str>,
}

impl FakeRunner {
    fn failing_on(prefix: &'static str) -> Self {
        Self {
            fail_on: Some(prefix),
            ..Self::default()
        }
    }

    fn lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        command: &'a ToolCommand,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(command.clone());

            let line = command.to_string();
            if self.fail_on.is_some_and(|prefix| line.starts_with(prefix)) {
                return Err(Error::toolchain(line, "process exited with exit status: 1"));
            }

            if command.program == "tar" && command.args.first().is_some_and(|a| a == "-cJvf") {
                let cwd = command.cwd.clone().unwrap_or_default();
                std::fs::write(cwd.join(&command.args[1]), vec![0xfd; 2048])?;
            }

            Ok(())
        })
    }

    fn output<'a>(
        &'a self,
        command: &'a ToolCommand,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(command.clone());
            Ok(String::new())
        })
    }
}

struct Workspace {
    _temp: TempDir,
    work_dir: std::path::PathBuf,
    target_dir: std::path::PathBuf,
}

fn workspace(with_binary: bool) -> Workspace {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join("work");
    let target_dir = temp.path().join("target");
    std::fs::create_dir_all(&work_dir).unwrap();
    std::fs::create_dir_all(target_dir.join("release")).unwrap();
    if with_binary {
        std::fs::write(target_dir.join("release").join("bearsays"), b"\x7fELF fake").unwrap();
    }
    Workspace {
        _temp: temp,
        work_dir,
        target_dir,
    }
}

fn context(target_dir: &Path, extra: &[(&str, String)]) -> BuildContext {
    let mut vars = vec![
        ("CARGO_TARGET_DIR", target_dir.display().to_string()),
        ("ARCH", "x86_64-unknown-linux-gnu".to_string()),
        ("BINARY_NAME", "bearsays".to_string()),
    ];
    vars.extend(extra.iter().cloned());
    BuildContext::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    })
    .unwrap()
}

fn publishing_vars(server_uri: &str) -> Vec<(&'static str, String)> {
    vec![
        ("GITHUB_REPOSITORY_OWNER", "bearcove".to_string()),
        ("GITHUB_REPOSITORY", "bearcove/bearsays".to_string()),
        ("GITHUB_SERVER_URL", server_uri.to_string()),
        ("FORGEJO_READWRITE_TOKEN", "rw-token-1234".to_string()),
        ("GITHUB_REF", "refs/tags/v2.2.0".to_string()),
    ]
}

#[tokio::test]
async fn test_dry_run_end_to_end() {
    let ws = workspace(true);
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    // Server URL is known but owner, repo, token and tag are not.
    let ctx = context(
        &ws.target_dir,
        &[("GITHUB_SERVER_URL", server.uri())],
    );
    assert!(ctx.dry_run.is_dry_run());

    let runner = FakeRunner::default();
    let backend = RegistryBackend::new();
    let report = PublishPipeline::new(&ctx, &runner, &backend)
        .with_work_dir(&ws.work_dir)
        .run()
        .await
        .unwrap();

    assert!(ws.work_dir.join("x86_64-unknown-linux-gnu.tar.xz").exists());
    assert_eq!(report.artifact.size(), 2048);
    assert!(report.publish.dry_run);
    assert_eq!(
        report.publish.url.as_deref(),
        Some(
            format!(
                "{}/api/packages/pkgowner/generic/pkgname/vX.Y.Z/x86_64-unknown-linux-gnu.tar.xz",
                server.uri()
            )
            .as_str()
        )
    );
    assert!(report.timings.upload.is_none());

    let release_dir = ws.target_dir.join("release").display().to_string();
    assert_eq!(
        runner.lines(),
        vec![
            "rustc --version".to_string(),
            "cargo --version".to_string(),
            "cargo sweep --version".to_string(),
            "cargo build --verbose --release".to_string(),
            format!("tar -cJvf x86_64-unknown-linux-gnu.tar.xz -C {release_dir} bearsays"),
            "tar -tvf x86_64-unknown-linux-gnu.tar.xz".to_string(),
            "cargo sweep --time 30".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_full_publish_uploads_once() {
    let ws = workspace(true);
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(
            "/api/packages/bearcove/generic/bearsays/v2.2.0/x86_64-unknown-linux-gnu.tar.xz",
        ))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&ws.target_dir, &publishing_vars(&server.uri()));
    assert!(!ctx.dry_run.is_dry_run());

    let runner = FakeRunner::default();
    let backend = RegistryBackend::new();
    let report = PublishPipeline::new(&ctx, &runner, &backend)
        .with_work_dir(&ws.work_dir)
        .run()
        .await
        .unwrap();

    assert!(!report.publish.dry_run);
    assert!(report.timings.upload.is_some());
    assert_eq!(runner.lines().last().unwrap(), "cargo sweep --time 30");
}

#[tokio::test]
async fn test_build_failure_stops_pipeline() {
    let ws = workspace(true);
    let ctx = context(&ws.target_dir, &[]);
    let runner = FakeRunner::failing_on("cargo build");
    let backend = RegistryBackend::new();

    let err = PublishPipeline::new(&ctx, &runner, &backend)
        .with_work_dir(&ws.work_dir)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Toolchain { .. }));
    assert!(!runner.lines().iter().any(|line| line.starts_with("tar")));
    assert!(!ws.work_dir.join("x86_64-unknown-linux-gnu.tar.xz").exists());
}

#[tokio::test]
async fn test_missing_toolchain_stops_before_build() {
    let ws = workspace(true);
    let ctx = context(&ws.target_dir, &[]);
    let runner = FakeRunner::failing_on("cargo sweep --version");
    let backend = RegistryBackend::new();

    let err = PublishPipeline::new(&ctx, &runner, &backend)
        .with_work_dir(&ws.work_dir)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Toolchain { .. }));
    assert!(!runner.lines().contains(&"cargo build --verbose --release".to_string()));
}

#[tokio::test]
async fn test_missing_binary_is_artifact_error() {
    let ws = workspace(false);
    let ctx = context(&ws.target_dir, &[]);
    let runner = FakeRunner::default();
    let backend = RegistryBackend::new();

    let err = PublishPipeline::new(&ctx, &runner, &backend)
        .with_work_dir(&ws.work_dir)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ArtifactMissing { .. }));
    assert!(!runner.lines().iter().any(|line| line.starts_with("tar")));
}

#[tokio::test]
async fn test_archive_listing_failure_is_fatal() {
    let ws = workspace(true);
    let ctx = context(&ws.target_dir, &[]);
    let runner = FakeRunner::failing_on("tar -tvf");
    let backend = RegistryBackend::new();

    let err = PublishPipeline::new(&ctx, &runner, &backend)
        .with_work_dir(&ws.work_dir)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Toolchain { .. }));
    assert!(!runner.lines().iter().any(|line| line.starts_with("cargo sweep --time")));
}

#[tokio::test]
async fn test_upload_rejection_skips_sweep() {
    let ws = workspace(true);
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&ws.target_dir, &publishing_vars(&server.uri()));
    let runner = FakeRunner::default();
    let backend = RegistryBackend::new();

    let err = PublishPipeline::new(&ctx, &runner, &backend)
        .with_work_dir(&ws.work_dir)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Publish { status: Some(500), .. }));
    assert!(!runner.lines().iter().any(|line| line.starts_with("cargo sweep --time")));
}

#[tokio::test]
async fn test_sweep_failure_after_upload_is_fatal() {
    let ws = workspace(true);
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&ws.target_dir, &publishing_vars(&server.uri()));
    let runner = FakeRunner::failing_on("cargo sweep --time");
    let backend = RegistryBackend::new();

    let err = PublishPipeline::new(&ctx, &runner, &backend)
        .with_work_dir(&ws.work_dir)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Toolchain { .. }));
}

#[tokio::test]
async fn test_relative_target_dir_follows_work_dir() {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join("work");
    let release_dir = work_dir.join("target").join("release");
    std::fs::create_dir_all(&release_dir).unwrap();
    std::fs::write(release_dir.join("bearsays"), b"\x7fELF fake").unwrap();

    let ctx = context(Path::new("target"), &[]);
    let runner = FakeRunner::default();
    let backend = RegistryBackend::new();

    let report = PublishPipeline::new(&ctx, &runner, &backend)
        .with_work_dir(&work_dir)
        .run()
        .await
        .unwrap();

    assert!(report.publish.dry_run);
    assert!(runner.lines().contains(&format!(
        "tar -cJvf x86_64-unknown-linux-gnu.tar.xz -C {} bearsays",
        release_dir.display()
    )));
}

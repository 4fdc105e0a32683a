//! Generic package registry backend.
//!
//! Uploads the archive with a single `PUT` to
//! `{server}/api/packages/{owner}/generic/{package}/{tag}/{archive}`.

use super::{PublishResult, ReleaseBackend};
use crate::artifact::{PackagedArtifact, format_bytes};
use crate::context::BuildContext;
use crate::error::{Error, Result};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use std::future::Future;
use std::pin::Pin;
use tracing::{info, warn};

/// Backend uploading to a generic package registry.
#[derive(Debug, Clone, Default)]
pub struct RegistryBackend {
    client: Client,
}

impl RegistryBackend {
    /// Creates a backend with a default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn upload(&self, ctx: &BuildContext, url: &str, artifact: &PackagedArtifact) -> Result<()> {
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, artifact.size().to_string())
            .header(AUTHORIZATION, format!("token {}", ctx.token.expose()))
            .body(artifact.content.clone())
            .send()
            .await
            .map_err(|e| Error::publish(format!("Upload to {url} failed: {e}"), None))?;

        let status = response.status();
        info!(status = status.as_u16(), "Registry response status");

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Failed to read registry response body");
                String::new()
            }
        };
        if !body.is_empty() {
            info!(body = %body, "Registry response body");
        }

        if !status.is_success() {
            return Err(Error::publish(
                format!("Registry returned {status} for {url}: {}", body.trim()),
                Some(status.as_u16()),
            ));
        }

        Ok(())
    }
}

impl ReleaseBackend for RegistryBackend {
    fn name(&self) -> &'static str {
        "registry"
    }

    fn publish<'a>(
        &'a self,
        ctx: &'a BuildContext,
        artifact: &'a PackagedArtifact,
    ) -> Pin<Box<dyn Future<Output = Result<PublishResult>> + Send + 'a>> {
        Box::pin(async move {
            let url = ctx.package_url(&artifact.archive_name);
            let size = artifact.size();

            if ctx.dry_run.is_dry_run() {
                info!(url = %url, size, "Dry run: simulating package upload");
                return Ok(PublishResult::dry_run(
                    self.name(),
                    format!("Would upload {size} bytes to {url}"),
                    url,
                ));
            }

            info!(url = %url, size = %format_bytes(size), "Uploading package");
            self.upload(ctx, &url, artifact).await?;

            Ok(PublishResult::success_with_url(
                self.name(),
                format!("Uploaded {}", artifact.archive_name),
                url,
            ))
        })
    }
}

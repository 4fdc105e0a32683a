//! Formula updater.
//!
//! Fetches the published archive for every target, checksums it and writes
//! the rendered formula to `{output_dir}/Formula/{repo}.rb`.

use crate::formula::{BinaryInfo, FormulaData, FormulaTemplate, class_name};
use bearsays_release::{ApiToken, Error, Result, Target, Version, format_bytes, sha256_hex};
use bytes::Bytes;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Smallest payload accepted as a real release archive (100 KiB).
pub const MIN_ARTIFACT_SIZE: u64 = 100 * 1024;

/// Configuration for the formula updater.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Base URL of the package registry
    pub server_url: String,
    /// Registry owner
    pub owner: String,
    /// Repository (and formula) name
    pub repo: String,
    /// Token for downloads; also embedded in the formula
    pub token: ApiToken,
    /// Directory the `Formula/` folder is written under
    pub output_dir: PathBuf,
    /// Template the formula is rendered from
    pub template: FormulaTemplate,
    /// Formula description
    pub desc: String,
    /// Project homepage URL
    pub homepage: String,
    /// License identifier
    pub license: String,
}

impl UpdaterConfig {
    /// Creates a configuration with the default template and metadata.
    #[must_use]
    pub fn new(
        server_url: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: ApiToken,
    ) -> Self {
        let server_url = server_url.into();
        let owner = owner.into();
        let repo = repo.into();
        let homepage = format!("{}/{owner}/{repo}", server_url.trim_end_matches('/'));
        Self {
            server_url,
            owner,
            repo,
            token,
            output_dir: PathBuf::from("."),
            template: FormulaTemplate::default(),
            desc: "Cool bear says stuff".to_string(),
            homepage,
            license: "MIT".to_string(),
        }
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the formula template.
    #[must_use]
    pub fn with_template(mut self, template: FormulaTemplate) -> Self {
        self.template = template;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    /// Sets the homepage.
    #[must_use]
    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = homepage.into();
        self
    }

    /// Sets the license.
    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    /// Download URL of the archive for `target` at `version`.
    #[must_use]
    pub fn artifact_url(&self, version: &Version, target: Target) -> String {
        format!(
            "{}/api/packages/{}/generic/{}/{}/{}",
            self.server_url.trim_end_matches('/'),
            self.owner,
            self.repo,
            version.tag(),
            target.archive_name()
        )
    }

    /// Path the formula is written to.
    #[must_use]
    pub fn formula_path(&self) -> PathBuf {
        self.output_dir
            .join("Formula")
            .join(format!("{}.rb", self.repo))
    }
}

/// Regenerates the formula file for a version.
#[derive(Debug, Clone)]
pub struct FormulaUpdater {
    config: UpdaterConfig,
    client: Client,
}

impl FormulaUpdater {
    /// Creates an updater with a default HTTP client.
    #[must_use]
    pub fn new(config: UpdaterConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Creates an updater using the given HTTP client.
    #[must_use]
    pub const fn with_client(config: UpdaterConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Downloads `url` and checksums the payload.
    ///
    /// # Errors
    ///
    /// Returns a fetch error on transport failure or any status other than
    /// 200, and an artifact-too-small error for payloads under
    /// [`MIN_ARTIFACT_SIZE`].
    pub async fn fetch_binary(&self, url: &str) -> Result<BinaryInfo> {
        info!(url, "Fetching binary");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("token {}", self.config.token.expose()))
            .send()
            .await
            .map_err(|e| Error::fetch(url, e.to_string(), None))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::fetch(
                url,
                format!("registry returned {status}"),
                Some(status.as_u16()),
            ));
        }

        let payload: Bytes = response
            .bytes()
            .await
            .map_err(|e| Error::fetch(url, e.to_string(), Some(status.as_u16())))?;
        let size = payload.len() as u64;

        if size < MIN_ARTIFACT_SIZE {
            return Err(Error::artifact_too_small(url, size, MIN_ARTIFACT_SIZE));
        }

        let sha256 = sha256_hex(&payload);
        info!(size = %format_bytes(size), sha256 = %sha256, "Binary fetched");

        Ok(BinaryInfo {
            url: url.to_string(),
            sha256,
            size,
        })
    }

    /// Fetches every target and renders the formula without writing it.
    ///
    /// # Errors
    ///
    /// Returns the first fetch or template error.
    pub async fn render(&self, version: &Version) -> Result<String> {
        let mut binaries = BTreeMap::new();
        for &target in Target::all() {
            let url = self.config.artifact_url(version, target);
            let info = self.fetch_binary(&url).await?;
            binaries.insert(target, info);
        }

        let data = FormulaData {
            class_name: class_name(&self.config.repo),
            desc: self.config.desc.clone(),
            homepage: self.config.homepage.clone(),
            license: self.config.license.clone(),
            binary: self.config.repo.clone(),
            version: version.to_string(),
            auth_token: self.config.token.clone(),
            binaries,
        };

        let formula = self.config.template.render(&data)?;
        debug!(formula_len = formula.len(), "Rendered formula");
        Ok(formula)
    }

    /// Regenerates the formula for `version` and writes it to disk.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns a fetch, template or I/O error. Nothing is written unless
    /// every target was fetched and the template rendered.
    pub async fn update(&self, version: &Version) -> Result<PathBuf> {
        info!(version = %version, repo = %self.config.repo, "Generating Homebrew formula");

        let formula = self.render(version).await?;

        let path = self.config.formula_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, formula.as_bytes()).await?;

        info!(path = %path.display(), "Homebrew formula written");
        Ok(path)
    }
}

//! Homebrew formula rendering.
//!
//! A formula is produced from a text template with `{{NAME}}` placeholders.
//! Every marker must name a known value; an unknown or unterminated
//! marker is rejected.

use bearsays_release::{ApiToken, Error, Result, Target};
use std::collections::BTreeMap;

/// Built-in formula template.
pub const DEFAULT_TEMPLATE: &str = r##"# frozen_string_literal: true

# {{DESC}}
class {{CLASS_NAME}} < Formula
  desc "{{DESC}}"
  homepage "{{HOMEPAGE}}"
  version "{{VERSION}}"
  license "{{LICENSE}}"

  if OS.mac?
    url "{{MAC_URL}}", headers: ["Authorization: token {{AUTH_TOKEN}}"]
    sha256 "{{MAC_SHA}}"
  elsif OS.linux?
    url "{{LINUX_URL}}", headers: ["Authorization: token {{AUTH_TOKEN}}"]
    sha256 "{{LINUX_SHA}}"
  end

  def install
    bin.install "{{BINARY}}"
  end

  test do
    assert_match "{{BINARY}} #{version}", shell_output("#{bin}/{{BINARY}} --version")
  end
end
"##;

/// Fetched binary information for a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryInfo {
    /// Download URL
    pub url: String,
    /// SHA256 checksum, lowercase hex
    pub sha256: String,
    /// Payload size in bytes
    pub size: u64,
}

/// Data for rendering a Homebrew formula.
#[derive(Debug, Clone)]
pub struct FormulaData {
    /// Formula class name (e.g., "Bearsays")
    pub class_name: String,
    /// Description
    pub desc: String,
    /// Homepage URL
    pub homepage: String,
    /// License identifier
    pub license: String,
    /// Installed binary name
    pub binary: String,
    /// Version without the leading `v`
    pub version: String,
    /// Token sent as the download `Authorization` header
    pub auth_token: ApiToken,
    /// Binary info per target
    pub binaries: BTreeMap<Target, BinaryInfo>,
}

impl FormulaData {
    fn binary(&self, target: Target) -> Result<&BinaryInfo> {
        self.binaries.get(&target).ok_or_else(|| {
            Error::template(format!("No artifact information for {target}"))
        })
    }
}

/// A formula template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaTemplate {
    text: String,
}

impl Default for FormulaTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl FormulaTemplate {
    /// Creates a template from raw text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Renders the template with `data`.
    ///
    /// Markers are replaced in a single pass over the template text, so
    /// values are inserted verbatim even if they contain `{{`.
    ///
    /// # Errors
    ///
    /// Returns a template error if a target has no binary info, or if the
    /// template has an unknown or unterminated `{{...}}` marker.
    pub fn render(&self, data: &FormulaData) -> Result<String> {
        let mac = data.binary(Target::DarwinArm64)?;
        let linux = data.binary(Target::LinuxX64)?;

        let values = [
            ("CLASS_NAME", data.class_name.as_str()),
            ("DESC", data.desc.as_str()),
            ("HOMEPAGE", data.homepage.as_str()),
            ("LICENSE", data.license.as_str()),
            ("BINARY", data.binary.as_str()),
            ("VERSION", data.version.as_str()),
            ("MAC_URL", mac.url.as_str()),
            ("MAC_SHA", mac.sha256.as_str()),
            ("LINUX_URL", linux.url.as_str()),
            ("LINUX_SHA", linux.sha256.as_str()),
            ("AUTH_TOKEN", data.auth_token.expose()),
        ];

        let mut rendered = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();

        while let Some(start) = rest.find("{{") {
            rendered.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find("}}") else {
                return Err(unresolved(&rest[start..]));
            };
            let name = &after[..end];

            let Some((_, value)) = values.iter().find(|(key, _)| *key == name) else {
                return Err(unresolved(&rest[start..start + end + 4]));
            };
            rendered.push_str(value);
            rest = &after[end + 2..];
        }
        rendered.push_str(rest);

        Ok(rendered)
    }
}

fn unresolved(marker: &str) -> Error {
    Error::template(format!(
        "Unresolved placeholder {marker} in formula template"
    ))
}

/// Converts a formula name to its Ruby class name (`bearsays` -> `Bearsays`).
#[must_use]
pub fn class_name(formula: &str) -> String {
    formula
        .split(['-', '_'])
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

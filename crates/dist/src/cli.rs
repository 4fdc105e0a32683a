//! Command-line surface of the release tool.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Success exit code.
pub const EXIT_OK: i32 = 0;
/// Exit code for any fatal error.
pub const EXIT_ERROR: i32 = 1;

#[derive(Debug, Parser)]
#[command(name = "bearsays-dist")]
#[command(about = "Build, publish and package bearsays releases", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the release binary, archive it and upload it to the registry
    ///
    /// Reads CARGO_TARGET_DIR, ARCH and BINARY_NAME (required) plus the
    /// GITHUB_* and token variables from the environment.
    Publish(PublishArgs),
    /// Regenerate Formula/<repo>.rb from the published archives
    UpdateFormula(UpdateFormulaArgs),
}

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Skip the upload even if the environment is fully configured
    #[arg(long)]
    pub dry_run: bool,

    /// Directory commands run in and the archive is written to
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct UpdateFormulaArgs {
    /// Version to package (e.g. 2.2.0); defaults to the latest git tag
    #[arg(long = "version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Base URL of the package registry
    #[arg(long, env = "FORMULA_SERVER_URL", default_value = "https://code.bearcove.cloud")]
    pub server_url: String,

    /// Registry owner
    #[arg(long, env = "FORMULA_OWNER", default_value = "bearcove")]
    pub owner: String,

    /// Repository and formula name
    #[arg(long, env = "FORMULA_REPO", default_value = "bearsays")]
    pub repo: String,

    /// Registry token used for downloads and embedded in the formula
    #[arg(long, env = "FORMULA_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Directory the Formula/ folder is written under
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Formula template file; the built-in template is used when omitted
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Formula description
    #[arg(long, default_value = "Cool bear says stuff")]
    pub desc: String,

    /// Project homepage; defaults to {server-url}/{owner}/{repo}
    #[arg(long)]
    pub homepage: Option<String>,

    /// License identifier
    #[arg(long, default_value = "MIT")]
    pub license: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_publish_defaults() {
        let cli = Cli::try_parse_from(["bearsays-dist", "publish"]).unwrap();
        let Commands::Publish(args) = cli.command else {
            panic!("expected publish");
        };
        assert!(!args.dry_run);
        assert_eq!(args.work_dir, PathBuf::from("."));
    }

    #[test]
    fn test_update_formula_args() {
        let cli = Cli::try_parse_from([
            "bearsays-dist",
            "update-formula",
            "--version",
            "v2.2.0",
            "--token",
            "abc",
            "--output-dir",
            "/tmp/out",
        ])
        .unwrap();
        let Commands::UpdateFormula(args) = cli.command else {
            panic!("expected update-formula");
        };
        assert_eq!(args.version.as_deref(), Some("v2.2.0"));
        assert_eq!(args.token, "abc");
        assert_eq!(args.output_dir, PathBuf::from("/tmp/out"));
        assert!(args.template.is_none());
    }
}

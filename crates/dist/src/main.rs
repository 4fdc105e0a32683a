//! Release tool for bearsays.
//!
//! - `publish` builds the binary for `ARCH`, archives it and uploads it to
//!   the generic package registry (dry-run when the CI context is incomplete)
//! - `update-formula` fetches the published archives and regenerates the
//!   Homebrew formula

mod cli;
mod tracing;

use ::tracing::info;
use bearsays_homebrew::{FormulaTemplate, FormulaUpdater, UpdaterConfig};
use bearsays_release::version::latest_tag_version;
use bearsays_release::{
    ApiToken, BuildContext, Error, PublishPipeline, RegistryBackend, Result, SystemRunner, Version,
};
use clap::Parser;
use cli::{Cli, Commands, EXIT_ERROR, EXIT_OK, PublishArgs, UpdateFormulaArgs};
use miette::Report;
use std::io::{self, Write};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { EXIT_ERROR } else { EXIT_OK };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // One line per message so errors stay greppable in CI logs.
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().wrap_lines(false).build())
    }));

    if let Err(e) = tracing::init_tracing() {
        render_report(&e);
        std::process::exit(EXIT_ERROR);
    }

    let result = match cli.command {
        Commands::Publish(args) => publish(args).await,
        Commands::UpdateFormula(args) => update_formula(args).await,
    };

    match result {
        Ok(()) => std::process::exit(EXIT_OK),
        Err(e) => {
            render_report(&Report::new(e));
            std::process::exit(EXIT_ERROR);
        }
    }
}

#[allow(clippy::print_stderr)]
fn render_report(report: &Report) {
    eprintln!("{report:?}");
    let _ = io::stderr().flush();
}

async fn publish(args: PublishArgs) -> Result<()> {
    let ctx = BuildContext::from_env()?.with_forced_dry_run(args.dry_run);
    let runner = SystemRunner::new();
    let backend = RegistryBackend::new();

    let report = PublishPipeline::new(&ctx, &runner, &backend)
        .with_work_dir(args.work_dir)
        .run()
        .await?;

    if report.publish.dry_run {
        info!(
            url = report.publish.url.as_deref().unwrap_or_default(),
            "Dry run finished, nothing was uploaded"
        );
    }
    Ok(())
}

async fn update_formula(args: UpdateFormulaArgs) -> Result<()> {
    let version = match args.version.as_deref() {
        Some(version) => version.parse::<Version>()?,
        None => {
            let version = latest_tag_version(&SystemRunner::new()).await?;
            info!(version = %version, "Detected latest version from git tags");
            version
        }
    };

    let template = match &args.template {
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                Error::configuration(
                    format!("Cannot read formula template {}: {e}", path.display()),
                    "Pass an existing file to --template or omit it",
                )
            })?;
            FormulaTemplate::new(text)
        }
        None => FormulaTemplate::default(),
    };

    let mut config = UpdaterConfig::new(
        args.server_url,
        args.owner,
        args.repo,
        ApiToken::new(args.token),
    )
    .with_output_dir(args.output_dir)
    .with_template(template)
    .with_desc(args.desc)
    .with_license(args.license);
    if let Some(homepage) = args.homepage {
        config = config.with_homepage(homepage);
    }

    let path = FormulaUpdater::new(config).update(&version).await?;
    info!(path = %path.display(), version = %version, "Formula updated");
    Ok(())
}

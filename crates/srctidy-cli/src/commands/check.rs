//! Check and fix command implementation.

use anyhow::{Context, Result};
use srctidy_checks::checks_for;
use srctidy_core::{CancelToken, CheckKind, Config, Mode, RunReport, Runner};
use std::path::Path;
use std::process::ExitCode;

use crate::config_resolver;
use crate::{OutputFormat, RunArgs};

/// Runs `check` (report mode) or `fix` (rewrite mode).
pub fn run(
    args: &RunArgs,
    mode: Mode,
    format: OutputFormat,
    config_path: Option<&Path>,
    cancel: CancelToken,
) -> Result<ExitCode> {
    let project_dir = args.path.as_deref().unwrap_or_else(|| Path::new("."));
    let source = config_resolver::resolve(project_dir, config_path);
    let mut config = config_resolver::load(&source)?;
    apply_overrides(&mut config, args)?;

    let root = config_resolver::source_root(args.path.as_deref(), &source, &config);
    let checks = checks_for(&config);

    let mut builder = Runner::builder()
        .config(&config)
        .root(&root)
        .checks(checks)
        .mode(mode)
        .cancel_token(cancel);
    for pattern in &args.exclude {
        builder = builder.exclude(pattern.clone());
    }
    let runner = builder.build()?;

    match config.product_label() {
        Some(label) => tracing::info!(
            "Checking {} in {} with {} checks",
            label,
            root.display(),
            runner.check_count()
        ),
        None => tracing::info!(
            "Checking {} with {} checks",
            root.display(),
            runner.check_count()
        ),
    }

    let report = runner.run()?;

    super::output::print(&report, format, mode, config.product_label().as_deref())?;

    Ok(ExitCode::from(exit_status(&report, mode)))
}

/// Applies `--checks` and `--jobs` on top of the loaded configuration.
fn apply_overrides(config: &mut Config, args: &RunArgs) -> Result<()> {
    if let Some(filter) = &args.checks {
        let kinds = parse_checks(filter)?;
        config.set_enabled_checks(kinds);
    }
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }
    Ok(())
}

/// Parses a comma-separated list of check names, slugs or codes.
fn parse_checks(filter: &str) -> Result<Vec<CheckKind>> {
    filter
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            name.parse::<CheckKind>()
                .context("run `srctidy list-checks` to see available checks")
        })
        .collect()
}

/// 0 when there is nothing left to do, 1 otherwise.
fn exit_status(report: &RunReport, mode: Mode) -> u8 {
    let ok = match mode {
        Mode::Report => report.is_clean(),
        Mode::Fix => report.fixed_cleanly(),
    };
    u8::from(!ok || report.cancelled)
}

//! Shared output formatting for run results.

use anyhow::Result;
use srctidy_core::{Mode, RunReport};
use std::fmt::Write as _;
use std::io::IsTerminal;

use crate::OutputFormat;

/// Print run results in the specified format.
pub fn print(
    report: &RunReport,
    format: OutputFormat,
    mode: Mode,
    label: Option<&str>,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let color = std::io::stdout().is_terminal();
            print!("{}", render_text(report, mode, label, color));
        }
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print!("{}", report.format_compact()),
    }
    Ok(())
}

/// Findings grouped under a header per file, then a summary line.
fn render_text(report: &RunReport, mode: Mode, label: Option<&str>, color: bool) -> String {
    let mut out = String::new();

    for file in &report.files {
        let marker = if file.modified { " (fixed)" } else { "" };
        let _ = writeln!(out, "{}{}", file.path.display(), marker);
        for finding in &file.findings {
            let _ = writeln!(out, "  {finding}");
        }
        for error in &file.errors {
            let _ = writeln!(out, "  error: {error}");
        }
        out.push('\n');
    }

    let s = &report.summary;
    let summary = match mode {
        Mode::Report => format!(
            "Found {} violation(s) and {} error(s) in {} file(s)",
            s.violations_found, s.errors, s.files_scanned
        ),
        Mode::Fix => format!(
            "Fixed {} of {} violation(s) in {} of {} file(s), {} error(s)",
            s.violations_fixed, s.violations_found, s.files_modified, s.files_scanned, s.errors
        ),
    };
    let summary = match label {
        Some(label) => format!("{label}: {summary}"),
        None => summary,
    };
    let summary = if report.cancelled {
        format!("{summary} (cancelled)")
    } else {
        summary
    };

    let clean = match mode {
        Mode::Report => report.is_clean(),
        Mode::Fix => report.fixed_cleanly(),
    };
    if color {
        let summary_color = if clean { "\x1b[32m" } else { "\x1b[31m" };
        let _ = writeln!(out, "{summary_color}{summary}\x1b[0m");
    } else {
        let _ = writeln!(out, "{summary}");
    }
    out
}

fn print_json(report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

//! srctidy CLI tool.
//!
//! Usage:
//! ```bash
//! srctidy check [OPTIONS] [PATH]
//! srctidy fix [OPTIONS] [PATH]
//! srctidy list-checks
//! srctidy init
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use srctidy_core::{CancelToken, ConfigError, Mode, RunError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Text-level style checker and fixer for C/C++ source trees
#[derive(Parser)]
#[command(name = "srctidy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report style violations without changing files
    Check {
        #[command(flatten)]
        run: RunArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Fix style violations in place
    Fix {
        #[command(flatten)]
        run: RunArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List available checks
    ListChecks,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Options shared by `check` and `fix`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Project directory (default: the current directory). Its `srctidy.toml`, if any, picks the source root
    pub path: Option<PathBuf>,

    /// Only run specific checks (comma-separated names or codes)
    #[arg(long)]
    pub checks: Option<String>,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Number of worker threads (default: one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Output format for run results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text grouped by file.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One line per finding.
    Compact,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            render_fatal(err);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check { run, format } => {
            let cancel = install_interrupt_handler();
            commands::check::run(&run, Mode::Report, format, cli.config.as_deref(), cancel)
        }
        Commands::Fix { run, format } => {
            let cancel = install_interrupt_handler();
            commands::check::run(&run, Mode::Fix, format, cli.config.as_deref(), cancel)
        }
        Commands::ListChecks => {
            commands::list_checks::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Cancels the returned token on Ctrl-C.
///
/// The signal is awaited on a small single-threaded runtime in a detached
/// thread, so the worker pool never blocks on it.
fn install_interrupt_handler() -> CancelToken {
    let token = CancelToken::new();
    let handle = token.clone();
    let spawned = std::thread::Builder::new()
        .name("srctidy-signal".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::warn!("Ctrl-C handling unavailable: {}", e);
                    return;
                }
            };
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, finishing files in progress");
                    handle.cancel();
                }
            });
        });
    if let Err(e) = spawned {
        tracing::warn!("Ctrl-C handling unavailable: {}", e);
    }
    token
}

/// Prints a fatal error, using the diagnostic renderer for core errors.
fn render_fatal(err: anyhow::Error) {
    let headline = err.to_string();
    let err = match err.downcast::<RunError>() {
        Ok(e) => return print_diagnostic(&headline, miette::Report::new(e)),
        Err(err) => err,
    };
    match err.downcast::<ConfigError>() {
        Ok(e) => print_diagnostic(&headline, miette::Report::new(e)),
        Err(err) => eprintln!("Error: {err:#}"),
    }
}

fn print_diagnostic(headline: &str, report: miette::Report) {
    if headline != report.to_string() {
        eprintln!("Error: {headline}");
    }
    eprintln!("{report:?}");
}

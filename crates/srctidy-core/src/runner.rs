//! Parallel runner that scans, and optionally fixes, a source tree.

use crate::aggregate::{rewrite_file, scan_file};
use crate::check::Check;
use crate::config::{Config, WalkerConfig};
use crate::source::SourceFile;
use crate::types::{FileError, FileReport, RunReport};
use crate::walker::FileWalker;

use miette::Diagnostic;
use rayon::prelude::*;
use std::fmt;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a run before any file is processed.
#[derive(Debug, Error, Diagnostic)]
pub enum RunError {
    /// The source root cannot be walked.
    #[error("cannot walk source root {}: {source}", .root.display())]
    #[diagnostic(
        code(srctidy::walk),
        help("check that `source` in srctidy.toml points to a readable directory")
    )]
    Walk {
        /// The configured root.
        root: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// An exclude pattern is not a valid glob.
    #[error("invalid exclude pattern `{pattern}`")]
    #[diagnostic(code(srctidy::pattern))]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Glob parse error.
        #[source]
        source: glob::PatternError,
    },

    /// The worker pool could not be created.
    #[error("failed to start worker pool: {0}")]
    #[diagnostic(code(srctidy::pool))]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The working directory could not be determined.
    #[error("IO error: {0}")]
    #[diagnostic(code(srctidy::io))]
    Io(#[from] io::Error),
}

/// What the runner does with findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Report findings without touching files.
    #[default]
    Report,
    /// Apply fixes and rewrite files in place.
    Fix,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report => write!(f, "report"),
            Self::Fix => write!(f, "fix"),
        }
    }
}

/// Cooperative cancellation flag shared between the runner and a signal
/// handler.
///
/// Workers check the token before starting a file and again before
/// committing a rewrite. A write already in progress always completes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Builder for configuring a [`Runner`].
pub struct RunnerBuilder<C> {
    root: Option<PathBuf>,
    checks: Vec<C>,
    walker: WalkerConfig,
    exclude: Vec<String>,
    mode: Mode,
    jobs: Option<usize>,
    cancel: CancelToken,
}

impl<C> Default for RunnerBuilder<C> {
    fn default() -> Self {
        Self {
            root: None,
            checks: Vec::new(),
            walker: WalkerConfig::default(),
            exclude: Vec::new(),
            mode: Mode::default(),
            jobs: None,
            cancel: CancelToken::default(),
        }
    }
}

impl<C: Check> RunnerBuilder<C> {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the root, walker settings and job count from a configuration.
    #[must_use]
    pub fn config(mut self, config: &Config) -> Self {
        self.root = Some(config.source.clone());
        self.walker = config.walker.clone();
        self.jobs = config.jobs;
        self
    }

    /// Sets the directory to walk.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a check.
    #[must_use]
    pub fn check(mut self, check: C) -> Self {
        self.checks.push(check);
        self
    }

    /// Adds several checks.
    #[must_use]
    pub fn checks<I: IntoIterator<Item = C>>(mut self, checks: I) -> Self {
        self.checks.extend(checks);
        self
    }

    /// Sets how files are enumerated.
    #[must_use]
    pub fn walker(mut self, walker: WalkerConfig) -> Self {
        self.walker = walker;
        self
    }

    /// Adds an exclude glob pattern on top of the walker settings.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Sets report or fix mode.
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the number of worker threads. `None` or zero uses one per core.
    #[must_use]
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Shares a cancellation token with the runner.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Builds the runner.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be walked or an exclude pattern
    /// is invalid.
    pub fn build(self) -> Result<Runner<C>, RunError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut walker = self.walker;
        walker.exclude.extend(self.exclude);
        let walker = FileWalker::new(root.clone(), &walker)?;

        Ok(Runner {
            root,
            checks: self.checks,
            walker,
            mode: self.mode,
            jobs: self.jobs.unwrap_or(0),
            cancel: self.cancel,
        })
    }
}

/// Walks a tree and runs checks over every file on a worker pool.
///
/// Use [`Runner::builder()`] to construct an instance.
pub struct Runner<C> {
    root: PathBuf,
    checks: Vec<C>,
    walker: FileWalker,
    mode: Mode,
    jobs: usize,
    cancel: CancelToken,
}

impl<C: Check> Runner<C> {
    /// Creates a new builder for configuring a runner.
    #[must_use]
    pub fn builder() -> RunnerBuilder<C> {
        RunnerBuilder::new()
    }

    /// Returns the root directory being walked.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Returns the run mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Runs every check over every file under the root.
    ///
    /// Per-file failures are recorded in the report; the run continues past
    /// them. The report lists files in path order regardless of the order
    /// in which workers finished.
    ///
    /// # Errors
    ///
    /// Returns an error only if the worker pool cannot be started.
    pub fn run(&self) -> Result<RunReport, RunError> {
        info!(
            "Starting {} run in {} with {} checks",
            self.mode,
            self.root.display(),
            self.checks.len()
        );

        let (files, walk_errors) = self.walker.collect();
        info!("Found {} files to check", files.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .thread_name(|i| format!("srctidy-worker-{i}"))
            .build()?;

        let (sender, receiver) = mpsc::channel();
        pool.install(|| {
            files.par_iter().for_each_with(sender, |sender, path| {
                if self.cancel.is_cancelled() {
                    return;
                }
                let (report, scanned) = self.process_file(path);
                // The receiver outlives the pool, so sending cannot fail.
                let _ = sender.send((report, scanned));
            });
        });

        let mut report = RunReport::new();
        for error in walk_errors {
            let path = self.relative(error_path(&error));
            let mut file = FileReport::new(path);
            file.errors.push(error);
            report.push(file, false);
        }
        for (file, scanned) in receiver {
            report.push(file, scanned);
        }
        report.sort();
        report.cancelled = self.cancel.is_cancelled();

        if report.cancelled {
            warn!(
                "Run cancelled after {} of {} files",
                report.summary.files_scanned,
                files.len()
            );
        }
        info!(
            "Run complete: {} files scanned, {} violations, {} fixed, {} errors",
            report.summary.files_scanned,
            report.summary.violations_found,
            report.summary.violations_fixed,
            report.summary.errors
        );
        Ok(report)
    }

    /// Processes one file. The flag is false when the file could not be
    /// read or decoded.
    fn process_file(&self, path: &Path) -> (FileReport, bool) {
        let relative = self.relative(path);
        debug!("Checking: {}", relative.display());
        let mut report = FileReport::new(relative.clone());

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => {
                warn!("Failed to read {}: {}", path.display(), source);
                report.errors.push(FileError::Read {
                    path: relative,
                    source,
                });
                return (report, false);
            }
        };
        let Ok(text) = String::from_utf8(bytes) else {
            warn!("Skipping {}: not valid UTF-8", relative.display());
            report.errors.push(FileError::Decode { path: relative });
            return (report, false);
        };

        let file = SourceFile::new(path, &self.root, text);
        let scan = scan_file(&self.checks, &file);

        if self.mode == Mode::Fix {
            let rewrite = rewrite_file(&self.checks, &file, &scan);
            match rewrite.text {
                Some(_) if self.cancel.is_cancelled() => {
                    debug!("Discarding fixes for {}: run cancelled", relative.display());
                }
                Some(text) if text != file.text => match atomic_write(path, text.as_bytes()) {
                    Ok(()) => {
                        debug!("Rewrote {}", relative.display());
                        report.modified = true;
                        report.fixed = rewrite.fixed;
                    }
                    Err(source) => {
                        warn!("Failed to write {}: {}", path.display(), source);
                        report.errors.push(FileError::Write {
                            path: relative,
                            source,
                        });
                    }
                },
                _ => {}
            }
            report.errors.extend(rewrite.errors);
        }

        report.findings = scan.findings;
        let mut errors = scan.errors;
        errors.append(&mut report.errors);
        report.errors = errors;
        (report, true)
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }
}

fn error_path(error: &FileError) -> &Path {
    match error {
        FileError::Read { path, .. }
        | FileError::Decode { path }
        | FileError::Write { path, .. }
        | FileError::Template { path, .. }
        | FileError::EditConflict { path, .. } => path,
    }
}

/// Replaces `path` with `contents` so that readers see either the old or
/// the new file, never a partial write.
///
/// The new contents go to a temporary file in the same directory, which is
/// synced and then renamed over the target. The target's permissions are
/// carried over. If any step fails the temporary file is removed and the
/// original is left untouched.
///
/// # Errors
///
/// Returns the first IO error encountered.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".srctidy-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    if let Ok(metadata) = std::fs::metadata(path) {
        std::fs::set_permissions(tmp.path(), metadata.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

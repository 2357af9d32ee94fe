//! The check trait implemented by every style check.

use crate::source::SourceFile;
use crate::types::{CheckKind, FileError, Finding};

/// Output of one check over one file.
#[derive(Debug, Default)]
pub struct Scan {
    /// Findings in ascending line order.
    pub findings: Vec<Finding>,
    /// Recovered errors. A check that reports errors on a file does not get
    /// to rewrite that file.
    pub errors: Vec<FileError>,
}

impl Scan {
    /// Creates a scan result from findings alone.
    #[must_use]
    pub fn findings(findings: Vec<Finding>) -> Self {
        Self {
            findings,
            errors: Vec::new(),
        }
    }

    /// Returns true if the check may rewrite the file.
    #[must_use]
    pub fn can_fix(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A text-level style check.
///
/// Implementations must be pure functions of the file: they read only the
/// [`SourceFile`] they are given and never touch the filesystem, so the
/// runner can call them from many threads at once.
///
/// # Example
///
/// ```ignore
/// use srctidy_core::{Check, CheckKind, Finding, Location, Scan, SourceFile};
///
/// struct NoFormFeeds;
///
/// impl Check for NoFormFeeds {
///     fn kind(&self) -> CheckKind { CheckKind::NoTabs }
///
///     fn scan(&self, file: &SourceFile) -> Scan {
///         let findings = file
///             .lines
///             .iter()
///             .filter(|l| l.content.contains('\x0c'))
///             .map(|l| Finding::new(
///                 self.kind(),
///                 Location::new(file.relative_path.clone(), l.index, 1),
///                 "form feed",
///             ))
///             .collect();
///         Scan::findings(findings)
///     }
/// }
/// ```
pub trait Check: Send + Sync {
    /// The kind this check implements.
    fn kind(&self) -> CheckKind;

    /// Configuration name (e.g., `NoTabs`).
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Check code (e.g., `ST001`).
    fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Returns a brief description of what this check enforces.
    fn description(&self) -> &'static str {
        ""
    }

    /// Scans one file.
    fn scan(&self, file: &SourceFile) -> Scan;
}

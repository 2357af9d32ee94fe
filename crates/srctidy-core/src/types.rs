//! Core types for findings, per-file reports and run results.

use crate::edit::TextEdit;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail a run.
    Info,
    /// Something went wrong while fixing, but the file is intact.
    Warning,
    /// A style violation.
    Violation,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Violation => write!(f, "violation"),
        }
    }
}

/// The closed set of checks.
///
/// Declaration order is significant: findings on the same line are ordered
/// by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    /// Tabs in leading whitespace.
    NoTabs,
    /// Blank lines (or a missing terminator) at end of file.
    NoTrailingLines,
    /// Spaces or tabs before a line terminator.
    NoTrailingSpaces,
    /// CRLF line terminators.
    #[serde(rename = "UnixEOL")]
    UnixEol,
    /// Unsorted include blocks.
    SortIncludes,
    /// Template directives awaiting expansion.
    ExpandTemplates,
}

impl CheckKind {
    /// All kinds in declaration order.
    pub const ALL: [Self; 6] = [
        Self::NoTabs,
        Self::NoTrailingLines,
        Self::NoTrailingSpaces,
        Self::UnixEol,
        Self::SortIncludes,
        Self::ExpandTemplates,
    ];

    /// Order in which fixes are applied during a rewrite.
    ///
    /// Content-producing transforms run first and terminator normalization
    /// runs last.
    pub const APPLICATION_ORDER: [Self; 6] = [
        Self::ExpandTemplates,
        Self::SortIncludes,
        Self::NoTabs,
        Self::NoTrailingSpaces,
        Self::NoTrailingLines,
        Self::UnixEol,
    ];

    /// Configuration name (e.g., `NoTabs`, `UnixEOL`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::NoTabs => "NoTabs",
            Self::NoTrailingLines => "NoTrailingLines",
            Self::NoTrailingSpaces => "NoTrailingSpaces",
            Self::UnixEol => "UnixEOL",
            Self::SortIncludes => "SortIncludes",
            Self::ExpandTemplates => "ExpandTemplates",
        }
    }

    /// Kebab-case name (e.g., `no-tabs`).
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::NoTabs => "no-tabs",
            Self::NoTrailingLines => "no-trailing-lines",
            Self::NoTrailingSpaces => "no-trailing-spaces",
            Self::UnixEol => "unix-eol",
            Self::SortIncludes => "sort-includes",
            Self::ExpandTemplates => "expand-templates",
        }
    }

    /// Stable check code (e.g., `ST001`).
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::NoTabs => "ST001",
            Self::NoTrailingLines => "ST002",
            Self::NoTrailingSpaces => "ST003",
            Self::UnixEol => "ST004",
            Self::SortIncludes => "ST005",
            Self::ExpandTemplates => "ST006",
        }
    }

    /// Position of this kind in [`CheckKind::APPLICATION_ORDER`].
    #[must_use]
    pub fn application_rank(self) -> usize {
        Self::APPLICATION_ORDER
            .iter()
            .position(|k| *k == self)
            .unwrap_or(Self::APPLICATION_ORDER.len())
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown check: {0}")]
pub struct UnknownCheck(pub String);

impl FromStr for CheckKind {
    type Err = UnknownCheck;

    /// Accepts the configuration name (case-insensitive), the slug or the code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s) || k.slug() == s || k.code() == s)
            .ok_or_else(|| UnknownCheck(s.to_string()))
    }
}

/// Source location of a finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to the source root.
    pub file: PathBuf,
    /// First line (1-indexed).
    pub line: usize,
    /// Last line of the span (equal to `line` for single-line findings).
    pub end_line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a single-line location.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            end_line: line,
            column,
        }
    }

    /// Extends the location to span through `end_line`.
    #[must_use]
    pub fn through(mut self, end_line: usize) -> Self {
        self.end_line = end_line.max(self.line);
        self
    }
}

/// A single reported issue, optionally carrying a fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Check that produced this finding.
    pub check: CheckKind,
    /// Severity of this finding.
    pub severity: Severity,
    /// Primary location.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Replacement that resolves the finding, if the check can fix it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<TextEdit>,
}

impl Finding {
    /// Creates a new violation without a fix.
    #[must_use]
    pub fn new(check: CheckKind, location: Location, message: impl Into<String>) -> Self {
        Self {
            check,
            severity: Severity::Violation,
            location,
            message: message.into(),
            fix: None,
        }
    }

    /// Attaches a fix.
    #[must_use]
    pub fn with_fix(mut self, fix: TextEdit) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Overrides the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Returns true if this finding can be fixed automatically.
    #[must_use]
    pub fn is_fixable(&self) -> bool {
        self.fix.is_some()
    }

    /// Ordering key within one file: line, then check kind, then column.
    #[must_use]
    pub fn sort_key(&self) -> (usize, CheckKind, usize) {
        (self.location.line, self.check, self.location.column)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.check,
            self.message
        )
    }
}

/// A per-file failure that does not abort the run.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// The file (or a directory entry) could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8 text.
    #[error("{} is not valid UTF-8", .path.display())]
    Decode {
        /// Path that failed.
        path: PathBuf,
    },

    /// The rewritten file could not be written back.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A template directive is malformed.
    #[error("{}:{line}: template error: {message}", .path.display())]
    Template {
        /// File containing the directive.
        path: PathBuf,
        /// Line where the directive opens.
        line: usize,
        /// What is wrong with it.
        message: String,
    },

    /// Fixes from one check overlapped and were dropped.
    #[error("{}: conflicting {check} fixes dropped: {message}", .path.display())]
    EditConflict {
        /// File being rewritten.
        path: PathBuf,
        /// Check whose fixes were dropped.
        check: CheckKind,
        /// Conflict description.
        message: String,
    },
}

impl FileError {
    /// Short machine-readable kind, used in JSON output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::Decode { .. } => "decode",
            Self::Write { .. } => "write",
            Self::Template { .. } => "template",
            Self::EditConflict { .. } => "edit-conflict",
        }
    }

    /// Line the error refers to, when it has one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Template { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl Serialize for FileError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FileError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Everything the run learned about one file.
#[derive(Debug, Default, Serialize)]
pub struct FileReport {
    /// File path relative to the source root.
    pub path: PathBuf,
    /// Findings sorted by `(line, check, column)`.
    pub findings: Vec<Finding>,
    /// Recovered per-file errors.
    pub errors: Vec<FileError>,
    /// Whether the file was rewritten.
    pub modified: bool,
    /// Number of findings resolved by the rewrite.
    pub fixed: usize,
}

impl FileReport {
    /// Creates an empty report for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Number of findings with [`Severity::Violation`].
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Violation)
            .count()
    }

    /// Returns true if nothing was found and nothing failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty() && self.errors.is_empty()
    }
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Files read and checked.
    pub files_scanned: usize,
    /// Files rewritten on disk.
    pub files_modified: usize,
    /// Violations found before fixing.
    pub violations_found: usize,
    /// Violations resolved by fixes.
    pub violations_fixed: usize,
    /// Recovered per-file errors.
    pub errors: usize,
}

/// Result of a complete run.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Per-file reports sorted by path. Clean files are omitted.
    pub files: Vec<FileReport>,
    /// Aggregate counters.
    pub summary: Summary,
    /// Whether the run stopped early on request.
    pub cancelled: bool,
}

impl RunReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over all findings in report order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.files.iter().flat_map(|f| f.findings.iter())
    }

    /// Iterates over all recovered errors in report order.
    pub fn errors(&self) -> impl Iterator<Item = &FileError> {
        self.files.iter().flat_map(|f| f.errors.iter())
    }

    /// Returns true if a report-only run found nothing to complain about.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.summary.violations_found == 0 && self.summary.errors == 0
    }

    /// Returns true if a fix run left nothing behind.
    #[must_use]
    pub fn fixed_cleanly(&self) -> bool {
        self.summary.errors == 0 && self.summary.violations_fixed == self.summary.violations_found
    }

    /// Renders findings as `<path>:<line>: [<CheckKind>] <description>` lines,
    /// followed by per-file errors, in report order.
    #[must_use]
    pub fn format_compact(&self) -> String {
        use std::fmt::Write;
        let mut output = String::new();
        for file in &self.files {
            for finding in &file.findings {
                let _ = writeln!(output, "{finding}");
            }
            for error in &file.errors {
                let _ = writeln!(output, "error: {error}");
            }
        }
        output
    }

    /// Inserts a file report and updates the counters.
    pub fn push(&mut self, file: FileReport, scanned: bool) {
        if scanned {
            self.summary.files_scanned += 1;
        }
        if file.modified {
            self.summary.files_modified += 1;
        }
        self.summary.violations_found += file.violation_count();
        self.summary.violations_fixed += file.fixed;
        self.summary.errors += file.errors.len();
        if !file.is_clean() || file.modified {
            self.files.push(file);
        }
    }

    /// Sorts file reports by path.
    pub fn sort(&mut self) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

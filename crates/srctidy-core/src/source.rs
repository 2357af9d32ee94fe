//! Line scanning over raw file text.
//!
//! Everything here is a pure function of the file text: no I/O and no
//! shared state, so it can run on any number of files concurrently.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Line terminator as it appears in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminator {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
    /// Last line of a file without a trailing newline.
    None,
}

impl Terminator {
    /// The terminator bytes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::None => "",
        }
    }

    /// Length of the terminator in bytes.
    #[must_use]
    pub fn byte_len(self) -> usize {
        self.as_str().len()
    }

    /// Returns true for [`Terminator::None`].
    #[must_use]
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

/// One line of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line number (1-indexed).
    pub index: usize,
    /// Byte offset of the first content byte.
    pub start: usize,
    /// Line text without its terminator.
    pub content: String,
    /// Terminator that ends this line.
    pub terminator: Terminator,
}

impl Line {
    /// Byte offset just past the content (where the terminator starts).
    #[must_use]
    pub fn content_end(&self) -> usize {
        self.start + self.content.len()
    }

    /// Byte offset just past the terminator.
    #[must_use]
    pub fn end(&self) -> usize {
        self.content_end() + self.terminator.byte_len()
    }

    /// Byte offset where the content ends once carriage returns running
    /// into the terminator are dropped.
    #[must_use]
    pub fn body_end(&self) -> usize {
        self.start + self.content.trim_end_matches('\r').len()
    }

    /// Returns true if the content is empty or only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        is_blank(&self.content)
    }
}

/// A file's text split into lines, owned by a single worker.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path as read from disk.
    pub path: PathBuf,
    /// Path relative to the source root, used in findings.
    pub relative_path: PathBuf,
    /// Full text.
    pub text: String,
    /// Lines in order.
    pub lines: Vec<Line>,
}

impl SourceFile {
    /// Creates a source file, computing the relative path against `root`.
    #[must_use]
    pub fn new(path: &Path, root: &Path, text: String) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);
        let lines = split_lines(&text);
        Self {
            path: path.to_path_buf(),
            relative_path,
            text,
            lines,
        }
    }

    /// Creates an in-memory source file whose path is also its relative path.
    #[must_use]
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();
        let lines = split_lines(&text);
        Self {
            relative_path: path.clone(),
            path,
            text,
            lines,
        }
    }

    /// Returns a copy of this file with its text replaced wholesale.
    #[must_use]
    pub fn with_text(&self, text: String) -> Self {
        let lines = split_lines(&text);
        Self {
            path: self.path.clone(),
            relative_path: self.relative_path.clone(),
            text,
            lines,
        }
    }

    /// Returns the line with the given 1-based number.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&Line> {
        index.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    /// Returns true if the file uses more than one terminator style.
    #[must_use]
    pub fn has_mixed_terminators(&self) -> bool {
        let mut seen = self
            .lines
            .iter()
            .map(|l| l.terminator)
            .filter(|t| !t.is_none());
        match seen.next() {
            Some(first) => seen.any(|t| t != first),
            None => false,
        }
    }
}

/// Splits text into lines, keeping each line's exact terminator.
///
/// A lone `\r` is treated as content. Empty text has no lines.
#[must_use]
pub fn split_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, piece) in text.split_inclusive('\n').enumerate() {
        let (content, terminator) = if let Some(rest) = piece.strip_suffix("\r\n") {
            (rest, Terminator::CrLf)
        } else if let Some(rest) = piece.strip_suffix('\n') {
            (rest, Terminator::Lf)
        } else {
            (piece, Terminator::None)
        };
        lines.push(Line {
            index: i + 1,
            start,
            content: content.to_string(),
            terminator,
        });
        start += piece.len();
    }
    lines
}

/// Returns true for space and tab.
#[must_use]
pub fn is_horizontal_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Returns true if the text is empty or only spaces, tabs and carriage
/// returns.
#[must_use]
pub fn is_blank(content: &str) -> bool {
    content.chars().all(|c| is_horizontal_space(c) || c == '\r')
}

/// Classification of a line's leading whitespace run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeadingWhitespace {
    /// Length of the run in bytes.
    pub len: usize,
    /// Number of tabs in the run.
    pub tabs: usize,
    /// Byte offset of the first tab, if any.
    pub first_tab: Option<usize>,
}

impl LeadingWhitespace {
    /// Returns true if the run contains at least one tab.
    #[must_use]
    pub fn has_tab(&self) -> bool {
        self.tabs > 0
    }
}

/// Classifies the leading space/tab run of a line.
#[must_use]
pub fn leading_whitespace(content: &str) -> LeadingWhitespace {
    let mut ws = LeadingWhitespace::default();
    for (i, b) in content.bytes().enumerate() {
        match b {
            b' ' => {}
            b'\t' => {
                ws.tabs += 1;
                ws.first_tab.get_or_insert(i);
            }
            _ => break,
        }
        ws.len = i + 1;
    }
    ws
}

/// Returns the byte offset where a trailing whitespace run starts, if the
/// content ends with one.
///
/// Carriage returns mixed into the run are part of it. A run of carriage
/// returns alone is left to terminator handling.
#[must_use]
pub fn trailing_whitespace_start(content: &str) -> Option<usize> {
    let trimmed = content.trim_end_matches(|c| is_horizontal_space(c) || c == '\r');
    content[trimmed.len()..]
        .contains(is_horizontal_space)
        .then_some(trimmed.len())
}

/// Returns the 0-based index of the first line in the run of blank lines
/// at end of file, scanning back until a non-blank line or the start.
#[must_use]
pub fn trailing_blank_start(lines: &[Line]) -> Option<usize> {
    let first_blank = lines
        .iter()
        .rposition(|l| !l.is_blank())
        .map_or(0, |i| i + 1);
    (first_blank < lines.len()).then_some(first_blank)
}

//! Check that a file ends with exactly one line terminator.
//!
//! Two shapes are flagged:
//!
//! - blank lines (empty or whitespace-only, carriage returns included) at
//!   the end of the file, reported
//!   as one finding spanning the whole run
//! - a non-empty last line with no terminator
//!
//! A file consisting only of blank lines is fixed to an empty file.

use srctidy_core::{
    trailing_blank_start, Check, CheckKind, Finding, Location, Scan, SourceFile, Terminator,
    TextEdit,
};

/// Flags missing or surplus line terminators at end of file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoTrailingLines;

impl NoTrailingLines {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for NoTrailingLines {
    fn kind(&self) -> CheckKind {
        CheckKind::NoTrailingLines
    }

    fn description(&self) -> &'static str {
        "Files end with a single line terminator and no blank lines"
    }

    fn scan(&self, file: &SourceFile) -> Scan {
        let Some(last) = file.lines.last() else {
            return Scan::default();
        };

        if let Some(first_blank) = trailing_blank_start(&file.lines) {
            let first = &file.lines[first_blank];
            let count = file.lines.len() - first_blank;
            let message = if count == 1 {
                "blank line at end of file".to_string()
            } else {
                format!("{count} blank lines at end of file")
            };
            let finding = Finding::new(
                self.kind(),
                Location::new(file.relative_path.clone(), first.index, 1).through(last.index),
                message,
            )
            .with_fix(TextEdit::delete(first.start..file.text.len()));
            return Scan::findings(vec![finding]);
        }

        if last.terminator.is_none() {
            // Follow the file's own style where there is one.
            let terminator = file
                .lines
                .len()
                .checked_sub(2)
                .map_or(Terminator::Lf, |i| file.lines[i].terminator);
            let body = &file.text[last.start..last.body_end()];
            // A dangling carriage return would turn into a second terminator.
            let finding = Finding::new(
                self.kind(),
                Location::new(
                    file.relative_path.clone(),
                    last.index,
                    body.chars().count() + 1,
                ),
                "missing line terminator at end of file",
            )
            .with_fix(TextEdit::new(last.body_end()..file.text.len(), terminator.as_str()));
            return Scan::findings(vec![finding]);
        }

        Scan::default()
    }
}

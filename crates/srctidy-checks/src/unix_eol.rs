//! Check that requires LF line terminators.
//!
//! Each CRLF terminator is flagged, together with any carriage returns
//! directly before it. When a file has CRLF terminators and its last line
//! has none, the fix also ends the file with LF. A file without CRLF is left
//! to [`NoTrailingLines`](crate::NoTrailingLines).

use srctidy_core::{
    Check, CheckKind, Finding, Line, Location, Scan, SourceFile, Terminator, TextEdit,
};

/// Flags each CRLF terminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnixEol;

impl UnixEol {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for UnixEol {
    fn kind(&self) -> CheckKind {
        CheckKind::UnixEol
    }

    fn description(&self) -> &'static str {
        "Lines end with LF, not CRLF"
    }

    fn scan(&self, file: &SourceFile) -> Scan {
        let message = if file.has_mixed_terminators() {
            "CRLF line terminator (file mixes LF and CRLF)"
        } else {
            "CRLF line terminator"
        };
        let column = |line: &Line| {
            line.content[..line.body_end() - line.start].chars().count() + 1
        };

        let mut findings: Vec<Finding> = file
            .lines
            .iter()
            .filter(|line| line.terminator == Terminator::CrLf)
            .map(|line| {
                Finding::new(
                    self.kind(),
                    Location::new(file.relative_path.clone(), line.index, column(line)),
                    message,
                )
                .with_fix(TextEdit::new(line.body_end()..line.end(), "\n"))
            })
            .collect();

        if let Some(last) = file.lines.last() {
            if !findings.is_empty() && last.terminator.is_none() {
                findings.push(
                    Finding::new(
                        self.kind(),
                        Location::new(file.relative_path.clone(), last.index, column(last)),
                        "missing LF at end of file",
                    )
                    .with_fix(TextEdit::new(last.body_end()..last.end(), "\n")),
                );
            }
        }
        Scan::findings(findings)
    }
}

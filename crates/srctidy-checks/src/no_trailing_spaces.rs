//! Check that forbids spaces and tabs at the end of a line.
//!
//! Carriage returns mixed into a trailing run are stripped along with it, so
//! nothing is left behind once the terminator is normalized.

use srctidy_core::{
    trailing_whitespace_start, Check, CheckKind, Finding, Location, Scan, SourceFile, TextEdit,
};

/// Flags trailing space/tab runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoTrailingSpaces;

impl NoTrailingSpaces {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for NoTrailingSpaces {
    fn kind(&self) -> CheckKind {
        CheckKind::NoTrailingSpaces
    }

    fn description(&self) -> &'static str {
        "Lines do not end with spaces or tabs"
    }

    fn scan(&self, file: &SourceFile) -> Scan {
        let findings = file
            .lines
            .iter()
            .filter_map(|line| {
                let offset = trailing_whitespace_start(&line.content)?;
                Some(
                    Finding::new(
                        self.kind(),
                        Location::new(file.relative_path.clone(), line.index, offset + 1),
                        "trailing whitespace",
                    )
                    .with_fix(TextEdit::delete(line.start + offset..line.content_end())),
                )
            })
            .collect();
        Scan::findings(findings)
    }
}

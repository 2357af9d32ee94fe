//! Check that forbids tabs in indentation.
//!
//! # Configuration
//!
//! - `tab_width`: Spaces written for each indentation tab (default: 4)
//!
//! Tabs after the first non-whitespace character are left alone.

use srctidy_core::{
    leading_whitespace, Check, CheckKind, Finding, Location, Scan, SourceFile, TextEdit,
};

/// Default number of spaces per tab.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Flags lines whose indentation contains a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoTabs {
    /// Spaces written for each tab.
    pub tab_width: usize,
}

impl Default for NoTabs {
    fn default() -> Self {
        Self::new()
    }
}

impl NoTabs {
    /// Creates a new check with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    /// Sets the number of spaces per tab.
    #[must_use]
    pub fn tab_width(mut self, width: usize) -> Self {
        self.tab_width = width;
        self
    }
}

impl Check for NoTabs {
    fn kind(&self) -> CheckKind {
        CheckKind::NoTabs
    }

    fn description(&self) -> &'static str {
        "Indentation uses spaces, not tabs"
    }

    fn scan(&self, file: &SourceFile) -> Scan {
        let spaces = " ".repeat(self.tab_width);
        let findings = file
            .lines
            .iter()
            .filter_map(|line| {
                let ws = leading_whitespace(&line.content);
                let first_tab = ws.first_tab?;
                let indent: String = line.content[..ws.len]
                    .chars()
                    .map(|c| if c == '\t' { spaces.as_str() } else { " " })
                    .collect();
                let message = if ws.tabs == 1 {
                    "tab in indentation".to_string()
                } else {
                    format!("{} tabs in indentation", ws.tabs)
                };
                Some(
                    Finding::new(
                        self.kind(),
                        Location::new(file.relative_path.clone(), line.index, first_tab + 1),
                        message,
                    )
                    .with_fix(TextEdit::new(line.start..line.start + ws.len, indent)),
                )
            })
            .collect();
        Scan::findings(findings)
    }
}

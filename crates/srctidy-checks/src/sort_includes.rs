//! Check that keeps each block of include directives sorted.
//!
//! Local (`"..."`) includes come before system (`<...>`) includes; within a
//! kind, targets are compared case-sensitively after normalization. Equal
//! keys keep their original order, so duplicates are kept in place.
//!
//! # Configuration
//!
//! - `max_blank_lines`: Blank lines allowed inside one block (default: 0)

use crate::includes::{find_blocks, parse_include, IncludeBlock};
use srctidy_core::{Check, CheckKind, Finding, Location, Scan, SourceFile, TextEdit};

/// Flags include blocks that are out of order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortIncludes {
    /// Blank lines allowed inside one block.
    pub max_blank_lines: usize,
}

impl SortIncludes {
    /// Creates a new check with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many consecutive blank lines may appear inside a block.
    #[must_use]
    pub fn max_blank_lines(mut self, count: usize) -> Self {
        self.max_blank_lines = count;
        self
    }

    fn check_block(&self, file: &SourceFile, block: &IncludeBlock) -> Option<Finding> {
        let lines = &file.lines;

        let mut order: Vec<usize> = (0..block.slots.len()).collect();
        order.sort_by_cached_key(|&i| {
            let directive = parse_include(&lines[block.slots[i]].content);
            (directive.map(|d| d.key()), i)
        });
        if order.iter().enumerate().all(|(slot, &i)| slot == i) {
            return None;
        }

        // Directive contents move between slots; blank lines and every
        // terminator stay where they are.
        let mut replacement = String::new();
        let mut slot = 0;
        for index in block.first..=block.last {
            let line = &lines[index];
            if block.slots.get(slot) == Some(&index) {
                replacement.push_str(&lines[block.slots[order[slot]]].content);
                slot += 1;
            } else {
                replacement.push_str(&line.content);
            }
            replacement.push_str(line.terminator.as_str());
        }

        let first = &lines[block.first];
        let last = &lines[block.last];
        Some(
            Finding::new(
                self.kind(),
                Location::new(file.relative_path.clone(), first.index, 1).through(last.index),
                format!("{} include directives are not sorted", block.slots.len()),
            )
            .with_fix(TextEdit::new(first.start..last.end(), replacement)),
        )
    }
}

impl Check for SortIncludes {
    fn kind(&self) -> CheckKind {
        CheckKind::SortIncludes
    }

    fn description(&self) -> &'static str {
        "Include directives are sorted within each block"
    }

    fn scan(&self, file: &SourceFile) -> Scan {
        let findings = find_blocks(&file.lines, self.max_blank_lines)
            .iter()
            .filter(|block| block.slots.len() > 1)
            .filter_map(|block| self.check_block(file, block))
            .collect();
        Scan::findings(findings)
    }
}

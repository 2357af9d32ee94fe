//! Per-file merging of findings and the in-memory rewrite pass.

use crate::check::Check;
use crate::edit::EditSet;
use crate::source::SourceFile;
use crate::types::{CheckKind, FileError, Finding};

use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Findings and errors from every enabled check over one file.
#[derive(Debug, Default)]
pub struct FileScan {
    /// Findings sorted by `(line, check, column)`.
    pub findings: Vec<Finding>,
    /// Recovered errors reported by checks.
    pub errors: Vec<FileError>,
    blocked: BTreeSet<CheckKind>,
}

impl FileScan {
    /// Returns true if `kind` reported errors and must not rewrite the file.
    #[must_use]
    pub fn is_blocked(&self, kind: CheckKind) -> bool {
        self.blocked.contains(&kind)
    }

    /// Number of findings from `kind` that carry a fix.
    #[must_use]
    pub fn fixable_count(&self, kind: CheckKind) -> usize {
        self.findings
            .iter()
            .filter(|f| f.check == kind && f.is_fixable())
            .count()
    }
}

/// Runs every check over `file` and merges the results.
///
/// Checks are independent: each sees only the original text.
#[must_use]
pub fn scan_file<C: Check>(checks: &[C], file: &SourceFile) -> FileScan {
    let mut merged = FileScan::default();
    for check in checks {
        let scan = check.scan(file);
        if !scan.can_fix() {
            debug!(
                "{} reported errors in {}, its fixes are skipped",
                check.name(),
                file.relative_path.display()
            );
            merged.blocked.insert(check.kind());
        }
        merged.findings.extend(scan.findings);
        merged.errors.extend(scan.errors);
    }
    merged.findings.sort_by_key(Finding::sort_key);
    merged
}

/// Outcome of the rewrite pass over one file.
#[derive(Debug, Default)]
pub struct Rewrite {
    /// New text, or `None` if no fix was applied.
    pub text: Option<String>,
    /// Original findings resolved by the applied fixes.
    pub fixed: usize,
    /// Checks whose fixes were applied, in application order.
    pub applied: Vec<CheckKind>,
    /// Conflicts that caused a check's fixes to be dropped.
    pub errors: Vec<FileError>,
    /// Findings still present after the rewrite. Empty at a fix-point.
    pub residual: Vec<Finding>,
}

/// Applies the fixes of every check, one check at a time, in
/// [`CheckKind::APPLICATION_ORDER`].
///
/// While the text is unchanged the fixes come straight from `scan`; once an
/// earlier stage has rewritten the text, a stage rescans the current text
/// with its own check so its offsets stay valid. A stage whose edits
/// overlap is dropped as a whole and recorded as an edit conflict.
#[must_use]
pub fn rewrite_file<C: Check>(checks: &[C], file: &SourceFile, scan: &FileScan) -> Rewrite {
    let mut ordered: Vec<&C> = checks.iter().collect();
    ordered.sort_by_key(|c| c.kind().application_rank());

    let mut rewrite = Rewrite::default();
    let mut current: Option<SourceFile> = None;

    for check in ordered {
        let kind = check.kind();
        if scan.is_blocked(kind) {
            continue;
        }

        let edits: Vec<_> = match &current {
            None => scan
                .findings
                .iter()
                .filter(|f| f.check == kind)
                .filter_map(|f| f.fix.clone())
                .collect(),
            Some(text) => {
                let rescan = check.scan(text);
                if !rescan.can_fix() {
                    continue;
                }
                rescan.findings.into_iter().filter_map(|f| f.fix).collect()
            }
        };
        if edits.is_empty() {
            continue;
        }

        let base = current.as_ref().unwrap_or(file);
        let applied = EditSet::new(edits).and_then(|set| set.apply(&base.text));
        match applied {
            Ok(text) => {
                debug!("Applied {} fixes to {}", kind, file.relative_path.display());
                rewrite.fixed += scan.fixable_count(kind);
                rewrite.applied.push(kind);
                current = Some(base.with_text(text));
            }
            Err(e) => {
                warn!(
                    "Dropping {} fixes for {}: {}",
                    kind,
                    file.relative_path.display(),
                    e
                );
                rewrite.errors.push(FileError::EditConflict {
                    path: file.relative_path.clone(),
                    check: kind,
                    message: e.to_string(),
                });
            }
        }
    }

    if let Some(fixed) = &current {
        let applied: Vec<&C> = checks
            .iter()
            .filter(|c| rewrite.applied.contains(&c.kind()))
            .collect();
        for check in applied {
            rewrite.residual.extend(check.scan(fixed).findings);
        }
        if !rewrite.residual.is_empty() {
            warn!(
                "{}: {} finding(s) remain after fixing",
                file.relative_path.display(),
                rewrite.residual.len()
            );
        }
    }

    rewrite.text = current.map(|f| f.text);
    rewrite
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Scan;
    use crate::edit::TextEdit;
    use crate::types::Location;

    /// Replaces every `x` with `y`.
    struct XToY;

    impl Check for XToY {
        fn kind(&self) -> CheckKind {
            CheckKind::NoTabs
        }

        fn scan(&self, file: &SourceFile) -> Scan {
            let findings = file
                .text
                .match_indices('x')
                .map(|(i, _)| {
                    Finding::new(
                        self.kind(),
                        Location::new(file.relative_path.clone(), 1, i + 1),
                        "x",
                    )
                    .with_fix(TextEdit::new(i..i + 1, "y"))
                })
                .collect();
            Scan::findings(findings)
        }
    }

    /// Proposes two overlapping edits whenever the text contains `y`.
    struct Overlapping;

    impl Check for Overlapping {
        fn kind(&self) -> CheckKind {
            CheckKind::UnixEol
        }

        fn scan(&self, file: &SourceFile) -> Scan {
            if !file.text.contains('y') {
                return Scan::default();
            }
            let loc = Location::new(file.relative_path.clone(), 1, 1);
            Scan::findings(vec![
                Finding::new(self.kind(), loc.clone(), "a").with_fix(TextEdit::delete(0..2)),
                Finding::new(self.kind(), loc, "b").with_fix(TextEdit::delete(1..3)),
            ])
        }
    }

    /// Always fails.
    struct Broken;

    impl Check for Broken {
        fn kind(&self) -> CheckKind {
            CheckKind::ExpandTemplates
        }

        fn scan(&self, file: &SourceFile) -> Scan {
            let loc = Location::new(file.relative_path.clone(), 1, 1);
            Scan {
                findings: vec![Finding::new(self.kind(), loc, "never applied")
                    .with_fix(TextEdit::delete(0..1))],
                errors: vec![FileError::Template {
                    path: file.relative_path.clone(),
                    line: 1,
                    message: "broken".to_string(),
                }],
            }
        }
    }

    enum TestCheck {
        XToY(XToY),
        Overlapping(Overlapping),
        Broken(Broken),
    }

    impl Check for TestCheck {
        fn kind(&self) -> CheckKind {
            match self {
                Self::XToY(c) => c.kind(),
                Self::Overlapping(c) => c.kind(),
                Self::Broken(c) => c.kind(),
            }
        }

        fn scan(&self, file: &SourceFile) -> Scan {
            match self {
                Self::XToY(c) => c.scan(file),
                Self::Overlapping(c) => c.scan(file),
                Self::Broken(c) => c.scan(file),
            }
        }
    }

    #[test]
    fn findings_are_merged_in_line_then_check_order() {
        let file = SourceFile::from_text("a.c", "xy");
        let checks = [TestCheck::Overlapping(Overlapping), TestCheck::XToY(XToY)];
        let scan = scan_file(&checks, &file);
        let kinds: Vec<_> = scan.findings.iter().map(|f| f.check).collect();
        assert_eq!(
            kinds,
            vec![CheckKind::NoTabs, CheckKind::UnixEol, CheckKind::UnixEol]
        );
    }

    #[test]
    fn rewrite_applies_fixes_and_reaches_fix_point() {
        let file = SourceFile::from_text("a.c", "axbx");
        let checks = [TestCheck::XToY(XToY)];
        let scan = scan_file(&checks, &file);
        let rewrite = rewrite_file(&checks, &file, &scan);
        assert_eq!(rewrite.text.as_deref(), Some("ayby"));
        assert_eq!(rewrite.fixed, 2);
        assert!(rewrite.residual.is_empty());
    }

    #[test]
    fn overlapping_stage_is_dropped_but_others_apply() {
        // XToY runs first and introduces `y`, so the rescan by Overlapping
        // proposes conflicting edits on the rewritten text.
        let file = SourceFile::from_text("a.c", "xxx");
        let checks = [TestCheck::Overlapping(Overlapping), TestCheck::XToY(XToY)];
        let scan = scan_file(&checks, &file);
        let rewrite = rewrite_file(&checks, &file, &scan);
        assert_eq!(rewrite.text.as_deref(), Some("yyy"));
        assert_eq!(rewrite.errors.len(), 1);
        assert!(matches!(
            rewrite.errors[0],
            FileError::EditConflict {
                check: CheckKind::UnixEol,
                ..
            }
        ));
    }

    #[test]
    fn check_with_errors_does_not_rewrite() {
        let file = SourceFile::from_text("a.c", "abc");
        let checks = [TestCheck::Broken(Broken)];
        let scan = scan_file(&checks, &file);
        assert!(scan.is_blocked(CheckKind::ExpandTemplates));
        assert_eq!(scan.errors.len(), 1);
        let rewrite = rewrite_file(&checks, &file, &scan);
        assert!(rewrite.text.is_none());
        assert_eq!(rewrite.fixed, 0);
    }
}

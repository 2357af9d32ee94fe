//! Check that expands template directives in place.
//!
//! Each directive becomes one finding whose fix replaces the directive,
//! markers included, with the template body. Expansion is single pass: the
//! inserted text is never scanned for directives again.
//!
//! Problems with a directive are reported as template errors rather than
//! findings, and any error in a file keeps all of this check's fixes out
//! of that file.

use crate::templates::{TemplateError, TemplateSet};
use srctidy_core::{
    Check, CheckKind, Config, FileError, Finding, Location, Scan, SourceFile, TextEdit,
};
use tracing::debug;

/// Expands configured templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandTemplates {
    templates: TemplateSet,
}

impl ExpandTemplates {
    /// Creates a check over the given template set.
    #[must_use]
    pub fn new(templates: TemplateSet) -> Self {
        Self { templates }
    }

    /// Creates a check from the `[templates]` and `[checks.ExpandTemplates]`
    /// configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let markers = &config.checks.expand_templates;
        let templates = TemplateSet::new(
            markers.open.clone(),
            markers.close.clone(),
            config.templates.clone(),
        );
        if templates.is_empty() {
            debug!("No templates configured; every directive is unknown");
        } else {
            debug!("{} template(s) configured", templates.len());
        }
        Self::new(templates)
    }

    fn error(file: &SourceFile, offset: usize, error: &TemplateError) -> FileError {
        FileError::Template {
            path: file.relative_path.clone(),
            line: line_of(&file.text, offset),
            message: error.to_string(),
        }
    }
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn column_of(text: &str, offset: usize) -> usize {
    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    text[line_start..offset].chars().count() + 1
}

impl Check for ExpandTemplates {
    fn kind(&self) -> CheckKind {
        CheckKind::ExpandTemplates
    }

    fn description(&self) -> &'static str {
        "Template directives are expanded"
    }

    fn scan(&self, file: &SourceFile) -> Scan {
        let mut scan = Scan::default();
        if !file.text.contains(self.templates.open()) {
            return scan;
        }

        for parsed in self.templates.parse(&file.text) {
            let directive = match parsed {
                Ok(directive) => directive,
                Err((offset, e)) => {
                    scan.errors.push(Self::error(file, offset, &e));
                    continue;
                }
            };
            let start = directive.span.start;
            match self.templates.expand(&directive) {
                Ok(expansion) => scan.findings.push(
                    Finding::new(
                        self.kind(),
                        Location::new(
                            file.relative_path.clone(),
                            line_of(&file.text, start),
                            column_of(&file.text, start),
                        ),
                        format!("unexpanded template `{}`", directive.name),
                    )
                    .with_fix(TextEdit::new(directive.span, expansion)),
                ),
                Err(e) => scan.errors.push(Self::error(file, start, &e)),
            }
        }

        if !scan.errors.is_empty() {
            debug!(
                "{}: {} template error(s)",
                file.relative_path.display(),
                scan.errors.len()
            );
        }
        scan
    }
}

//! The closed set of built-in checks and construction from configuration.

use crate::{ExpandTemplates, NoTabs, NoTrailingLines, NoTrailingSpaces, SortIncludes, UnixEol};
use srctidy_core::{Check, CheckKind, Config, Scan, SourceFile};

/// Any built-in check.
///
/// The runner is generic over [`Check`], so a `Vec<AnyCheck>` runs every
/// configured check without boxing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyCheck {
    /// [`NoTabs`]
    NoTabs(NoTabs),
    /// [`NoTrailingLines`]
    NoTrailingLines(NoTrailingLines),
    /// [`NoTrailingSpaces`]
    NoTrailingSpaces(NoTrailingSpaces),
    /// [`UnixEol`]
    UnixEol(UnixEol),
    /// [`SortIncludes`]
    SortIncludes(SortIncludes),
    /// [`ExpandTemplates`]
    ExpandTemplates(ExpandTemplates),
}

impl AnyCheck {
    /// Builds the check for `kind` using the options in `config`.
    #[must_use]
    pub fn from_config(kind: CheckKind, config: &Config) -> Self {
        match kind {
            CheckKind::NoTabs => {
                Self::NoTabs(NoTabs::new().tab_width(config.checks.no_tabs.tab_width))
            }
            CheckKind::NoTrailingLines => Self::NoTrailingLines(NoTrailingLines::new()),
            CheckKind::NoTrailingSpaces => Self::NoTrailingSpaces(NoTrailingSpaces::new()),
            CheckKind::UnixEol => Self::UnixEol(UnixEol::new()),
            CheckKind::SortIncludes => Self::SortIncludes(
                SortIncludes::new().max_blank_lines(config.checks.sort_includes.max_blank_lines),
            ),
            CheckKind::ExpandTemplates => {
                Self::ExpandTemplates(ExpandTemplates::from_config(config))
            }
        }
    }

    fn inner(&self) -> &dyn Check {
        match self {
            Self::NoTabs(c) => c,
            Self::NoTrailingLines(c) => c,
            Self::NoTrailingSpaces(c) => c,
            Self::UnixEol(c) => c,
            Self::SortIncludes(c) => c,
            Self::ExpandTemplates(c) => c,
        }
    }
}

impl Check for AnyCheck {
    fn kind(&self) -> CheckKind {
        self.inner().kind()
    }

    fn description(&self) -> &'static str {
        self.inner().description()
    }

    fn scan(&self, file: &SourceFile) -> Scan {
        self.inner().scan(file)
    }
}

/// Returns the checks enabled in `config`, in [`CheckKind`] order.
#[must_use]
pub fn checks_for(config: &Config) -> Vec<AnyCheck> {
    config
        .enabled_checks()
        .into_iter()
        .map(|kind| AnyCheck::from_config(kind, config))
        .collect()
}

/// Returns every check with default options.
#[must_use]
pub fn all_checks() -> Vec<AnyCheck> {
    let config = Config::default();
    CheckKind::ALL
        .into_iter()
        .map(|kind| AnyCheck::from_config(kind, &config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_checks_cover_every_kind() {
        let kinds: Vec<_> = all_checks().iter().map(Check::kind).collect();
        assert_eq!(kinds, CheckKind::ALL.to_vec());
    }

    #[test]
    fn test_checks_for_respects_tools_and_options() {
        let config = Config::parse(
            r"
[tools]
NoTabs = true
SortIncludes = true

[checks.NoTabs]
tab_width = 2
",
        )
        .unwrap();
        let checks = checks_for(&config);
        assert_eq!(
            checks,
            vec![
                AnyCheck::NoTabs(NoTabs::new().tab_width(2)),
                AnyCheck::SortIncludes(SortIncludes::new()),
            ]
        );
    }

    #[test]
    fn test_descriptions_are_not_empty() {
        for check in all_checks() {
            assert!(!check.description().is_empty(), "{}", check.name());
        }
    }
}

//! Configuration types for srctidy.

use crate::types::CheckKind;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Top-level configuration for srctidy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Product name, shown in report headers.
    #[serde(default)]
    pub product: Option<String>,

    /// Product version.
    #[serde(default)]
    pub version: Option<String>,

    /// Product prefix (e.g., `MATHPRESSO`).
    #[serde(default)]
    pub prefix: Option<String>,

    /// Source root, relative to the directory holding the config file.
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Enabled checks. When the table is absent every check is enabled.
    #[serde(default)]
    pub tools: Option<Tools>,

    /// File selection.
    #[serde(default)]
    pub walker: WalkerConfig,

    /// Per-check options.
    #[serde(default)]
    pub checks: ChecksConfig,

    /// Template definitions for `ExpandTemplates`.
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateDef>,

    /// Maximum number of files processed in parallel.
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            product: None,
            version: None,
            prefix: None,
            source: default_source(),
            tools: None,
            walker: WalkerConfig::default(),
            checks: ChecksConfig::default(),
            templates: BTreeMap::new(),
            jobs: None,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a value is out of range.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option ranges and template definitions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tab_width = self.checks.no_tabs.tab_width;
        if !(1..=16).contains(&tab_width) {
            return Err(ConfigError::invalid(format!(
                "checks.NoTabs.tab_width must be between 1 and 16, got {tab_width}"
            )));
        }

        let markers = &self.checks.expand_templates;
        if markers.open.is_empty() || markers.close.is_empty() {
            return Err(ConfigError::invalid(
                "checks.ExpandTemplates markers must not be empty",
            ));
        }

        for (name, def) in &self.templates {
            if !is_identifier(name) {
                return Err(ConfigError::invalid(format!(
                    "template name `{name}` is not an identifier"
                )));
            }
            if def.variadic && def.params.is_some() {
                return Err(ConfigError::invalid(format!(
                    "template `{name}` cannot set both `params` and `variadic`"
                )));
            }
            if def.params.is_some_and(|p| p > MAX_TEMPLATE_PARAMS) {
                return Err(ConfigError::invalid(format!(
                    "template `{name}` takes at most {MAX_TEMPLATE_PARAMS} parameters"
                )));
            }
            if def.body.contains(&markers.open) {
                tracing::warn!(
                    "template `{}` expands to text containing `{}`; the next run will expand it again",
                    name,
                    markers.open
                );
            }
        }

        Ok(())
    }

    /// Returns the set of enabled checks.
    #[must_use]
    pub fn enabled_checks(&self) -> BTreeSet<CheckKind> {
        match &self.tools {
            Some(tools) => tools.enabled(),
            None => CheckKind::ALL.into_iter().collect(),
        }
    }

    /// Replaces the enabled set.
    pub fn set_enabled_checks<I: IntoIterator<Item = CheckKind>>(&mut self, kinds: I) {
        let mut tools = Tools::default();
        for kind in kinds {
            tools.set(kind, true);
        }
        self.tools = Some(tools);
    }

    /// Product label for report headers (e.g., `mathpresso 1.0.0`).
    #[must_use]
    pub fn product_label(&self) -> Option<String> {
        let product = self.product.as_deref()?;
        Some(match &self.version {
            Some(version) => format!("{product} {version}"),
            None => product.to_string(),
        })
    }
}

/// Maximum number of positional template parameters (`$1`..`$9`).
pub const MAX_TEMPLATE_PARAMS: usize = 9;

fn default_source() -> PathBuf {
    PathBuf::from(".")
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The `[tools]` table: one switch per check.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
    /// `NoTabs`
    #[serde(rename = "NoTabs")]
    pub no_tabs: bool,
    /// `NoTrailingLines`
    #[serde(rename = "NoTrailingLines")]
    pub no_trailing_lines: bool,
    /// `NoTrailingSpaces`
    #[serde(rename = "NoTrailingSpaces")]
    pub no_trailing_spaces: bool,
    /// `UnixEOL`
    #[serde(rename = "UnixEOL")]
    pub unix_eol: bool,
    /// `SortIncludes`
    #[serde(rename = "SortIncludes")]
    pub sort_includes: bool,
    /// `ExpandTemplates`
    #[serde(rename = "ExpandTemplates")]
    pub expand_templates: bool,
}

impl Tools {
    /// Returns whether `kind` is switched on.
    #[must_use]
    pub fn is_enabled(&self, kind: CheckKind) -> bool {
        match kind {
            CheckKind::NoTabs => self.no_tabs,
            CheckKind::NoTrailingLines => self.no_trailing_lines,
            CheckKind::NoTrailingSpaces => self.no_trailing_spaces,
            CheckKind::UnixEol => self.unix_eol,
            CheckKind::SortIncludes => self.sort_includes,
            CheckKind::ExpandTemplates => self.expand_templates,
        }
    }

    /// Switches `kind` on or off.
    pub fn set(&mut self, kind: CheckKind, enabled: bool) {
        let slot = match kind {
            CheckKind::NoTabs => &mut self.no_tabs,
            CheckKind::NoTrailingLines => &mut self.no_trailing_lines,
            CheckKind::NoTrailingSpaces => &mut self.no_trailing_spaces,
            CheckKind::UnixEol => &mut self.unix_eol,
            CheckKind::SortIncludes => &mut self.sort_includes,
            CheckKind::ExpandTemplates => &mut self.expand_templates,
        };
        *slot = enabled;
    }

    /// Returns the enabled kinds.
    #[must_use]
    pub fn enabled(&self) -> BTreeSet<CheckKind> {
        CheckKind::ALL
            .into_iter()
            .filter(|k| self.is_enabled(*k))
            .collect()
    }
}

/// File selection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// File extensions to check, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names pruned wherever they appear.
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,

    /// Glob patterns, matched against root-relative paths, to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect `.gitignore` files.
    #[serde(default)]
    pub respect_gitignore: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore_dirs: default_ignore_dirs(),
            exclude: Vec::new(),
            respect_gitignore: false,
        }
    }
}

fn default_extensions() -> Vec<String> {
    ["c", "cc", "cpp", "cxx", "h", "hh", "hpp", "hxx", "inl"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_ignore_dirs() -> Vec<String> {
    [".git", "build", "target", "node_modules"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Per-check options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// `[checks.NoTabs]`
    #[serde(rename = "NoTabs")]
    pub no_tabs: NoTabsConfig,
    /// `[checks.SortIncludes]`
    #[serde(rename = "SortIncludes")]
    pub sort_includes: SortIncludesConfig,
    /// `[checks.ExpandTemplates]`
    #[serde(rename = "ExpandTemplates")]
    pub expand_templates: ExpandTemplatesConfig,
}

/// Options for `NoTabs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoTabsConfig {
    /// Spaces substituted for each leading tab.
    pub tab_width: usize,
}

impl Default for NoTabsConfig {
    fn default() -> Self {
        Self { tab_width: 4 }
    }
}

/// Options for `SortIncludes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortIncludesConfig {
    /// Consecutive blank lines tolerated inside one include block.
    pub max_blank_lines: usize,
}

/// Options for `ExpandTemplates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandTemplatesConfig {
    /// Token that opens a directive.
    pub open: String,
    /// Token that closes a directive.
    pub close: String,
}

impl Default for ExpandTemplatesConfig {
    fn default() -> Self {
        Self {
            open: "${{".to_string(),
            close: "}}".to_string(),
        }
    }
}

/// One `[templates.NAME]` definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDef {
    /// Expansion text with `$1`..`$9`, `$@`, `$#` and `$$` placeholders.
    pub body: String,

    /// Exact number of arguments. Defaults to zero unless `variadic`.
    #[serde(default)]
    pub params: Option<usize>,

    /// Accepts any number of arguments.
    #[serde(default)]
    pub variadic: bool,
}

impl TemplateDef {
    /// Required argument count, or `None` for variadic templates.
    #[must_use]
    pub fn fixed_arity(&self) -> Option<usize> {
        if self.variadic {
            None
        } else {
            Some(self.params.unwrap_or(0))
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {}: {source}", .path.display())]
    #[diagnostic(code(srctidy::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(srctidy::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A value is syntactically fine but not acceptable.
    #[error("Invalid config: {message}")]
    #[diagnostic(
        code(srctidy::config::invalid),
        help("run `srctidy init` to see a commented default configuration")
    )]
    Invalid {
        /// What is wrong.
        message: String,
    },
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source, PathBuf::from("."));
        assert_eq!(config.enabled_checks().len(), CheckKind::ALL.len());
        assert_eq!(config.checks.no_tabs.tab_width, 4);
        assert_eq!(config.checks.sort_includes.max_blank_lines, 0);
        assert!(config.walker.extensions.contains(&"cpp".to_string()));
    }

    #[test]
    fn test_parse_config() {
        let toml = r##"
product = "mathpresso"
version = "1.0.0"
prefix = "MATHPRESSO"
source = "src/mathpresso"

[tools]
NoTabs = true
NoTrailingLines = true
UnixEOL = true

[walker]
extensions = ["cpp", "h"]
exclude = ["**/generated/**"]

[checks.NoTabs]
tab_width = 2

[templates.guard]
params = 1
body = "#ifndef $1"
"##;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.source, PathBuf::from("src/mathpresso"));
        assert_eq!(config.product_label().as_deref(), Some("mathpresso 1.0.0"));
        let enabled = config.enabled_checks();
        assert!(enabled.contains(&CheckKind::NoTabs));
        assert!(enabled.contains(&CheckKind::UnixEol));
        assert!(!enabled.contains(&CheckKind::SortIncludes));
        assert_eq!(config.checks.no_tabs.tab_width, 2);
        assert_eq!(config.walker.extensions, vec!["cpp", "h"]);
        assert_eq!(config.walker.ignore_dirs, default_ignore_dirs());

        let guard = config.templates.get("guard").unwrap();
        assert_eq!(guard.fixed_arity(), Some(1));
    }

    #[test]
    fn rejects_out_of_range_tab_width() {
        let err = Config::parse("[checks.NoTabs]\ntab_width = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_template_with_params_and_variadic() {
        let toml = "[templates.list]\nbody = \"$@\"\nparams = 2\nvariadic = true\n";
        assert!(matches!(
            Config::parse(toml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_bad_template_name() {
        let toml = "[templates.\"two words\"]\nbody = \"x\"\n";
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn variadic_template_has_no_fixed_arity() {
        let def = TemplateDef {
            body: "$@".to_string(),
            params: None,
            variadic: true,
        };
        assert_eq!(def.fixed_arity(), None);
    }

    #[test]
    fn set_enabled_checks_replaces_tools() {
        let mut config = Config::default();
        config.set_enabled_checks([CheckKind::UnixEol]);
        assert_eq!(
            config.enabled_checks().into_iter().collect::<Vec<_>>(),
            vec![CheckKind::UnixEol]
        );
    }

    #[test]
    fn parse_error_is_reported() {
        assert!(matches!(
            Config::parse("product = ["),
            Err(ConfigError::Parse { .. })
        ));
    }
}

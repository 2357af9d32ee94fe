//! Locating and loading `srctidy.toml`.
//!
//! The configuration file is looked up in this order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/srctidy.toml` or `{project}/.srctidy.toml`
//! 3. `$SRCTIDY_CONFIG_DIR/config.toml`, else `~/.srctidy/config.toml`
//! 4. Built-in defaults
//!
//! A relative `source` in a project or explicit config is resolved against
//! the directory holding that file, so `srctidy check` behaves the same from
//! any working directory. A path on the command line names the project
//! directory; it is walked directly only when it holds no project config.

use anyhow::{Context, Result};
use srctidy_core::Config;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the per-user directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Directory that a relative `source` is resolved against. The per-user
    /// config is shared between projects, so it has none.
    #[must_use]
    pub fn base_dir(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) => p.parent(),
            Self::Global(_) | Self::Default => None,
        }
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["srctidy.toml", ".srctidy.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Finds the configuration file for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    let project = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file());
    if let Some(candidate) = project {
        tracing::debug!("Found project config: {}", candidate.display());
        return ConfigSource::Project(candidate);
    }

    let global = global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file());
    if let Some(candidate) = global {
        tracing::debug!("Found global config: {}", candidate.display());
        return ConfigSource::Global(candidate);
    }

    ConfigSource::Default
}

/// Per-user config directory: `$SRCTIDY_CONFIG_DIR`, else `~/.srctidy/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("SRCTIDY_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".srctidy"))
}

/// Loads and validates the configuration from `source`.
///
/// # Errors
///
/// Returns the [`ConfigError`](srctidy_core::ConfigError) with the file
/// path as context.
pub fn load(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        tracing::debug!("No config file found, using defaults");
        return Ok(Config::default());
    };
    if matches!(source, ConfigSource::Global(_)) {
        tracing::info!("Using global config: {}", path.display());
    }
    Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Picks the directory to walk.
///
/// The command-line path names the project. When a config was found inside
/// it, that config's `source` applies; otherwise the path itself is walked.
/// Without a path, `source` from any config is used.
#[must_use]
pub fn source_root(cli_path: Option<&Path>, source: &ConfigSource, config: &Config) -> PathBuf {
    let from_config = || match source.base_dir() {
        Some(base) if config.source.is_relative() => base.join(&config.source),
        _ => config.source.clone(),
    };
    match (cli_path, source) {
        (_, ConfigSource::Project(_)) | (None, _) => from_config(),
        (Some(path), _) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_even_when_missing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("srctidy.toml"), "").unwrap();
        let explicit = Path::new("/nonexistent.toml");

        let result = resolve_inner(tmp.path(), Some(explicit), None);
        assert_eq!(result, ConfigSource::Explicit(explicit.to_path_buf()));
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".srctidy.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join(".srctidy.toml"))
        );

        fs::write(tmp.path().join("srctidy.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join("srctidy.toml"))
        );
    }

    #[test]
    fn global_is_only_a_fallback() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "").unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(
            result,
            ConfigSource::Global(global.path().join("config.toml"))
        );

        fs::write(project.path().join("srctidy.toml"), "").unwrap();
        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert!(matches!(result, ConfigSource::Project(_)));
    }

    #[test]
    fn empty_global_dir_falls_back_to_defaults() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
    }

    #[test]
    fn load_reports_invalid_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("srctidy.toml");
        fs::write(&path, "[checks.NoTabs]\ntab_width = 0\n").unwrap();

        let err = load(&ConfigSource::Project(path)).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config"));
        assert!(err.downcast_ref::<srctidy_core::ConfigError>().is_some());
    }

    #[test]
    fn source_is_relative_to_project_config() {
        let config = Config::parse("source = \"src/mathpresso\"").unwrap();
        let project = ConfigSource::Project(PathBuf::from("/repo/srctidy.toml"));
        assert_eq!(
            source_root(None, &project, &config),
            PathBuf::from("/repo/src/mathpresso")
        );
        assert_eq!(
            source_root(None, &ConfigSource::Default, &config),
            PathBuf::from("src/mathpresso")
        );
        assert_eq!(
            source_root(Some(Path::new("/repo")), &project, &config),
            PathBuf::from("/repo/src/mathpresso")
        );

        let explicit = ConfigSource::Explicit(PathBuf::from("/etc/srctidy.toml"));
        assert_eq!(
            source_root(Some(Path::new("lib")), &explicit, &config),
            PathBuf::from("lib")
        );
        assert_eq!(
            source_root(Some(Path::new("lib")), &ConfigSource::Default, &config),
            PathBuf::from("lib")
        );
    }
}

//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const CONFIG_NAME: &str = "srctidy.toml";

const DEFAULT_CONFIG: &str = r##"# srctidy configuration

# Product metadata, shown in report headers
# product = "mathpresso"
# version = "1.0.0"
# prefix = "MATHPRESSO"

# Source root, relative to this file
source = "."

# Checks to run. Remove the table to enable every check.
[tools]
NoTabs = true
NoTrailingLines = true
NoTrailingSpaces = true
UnixEOL = true
SortIncludes = true
ExpandTemplates = true

[walker]
extensions = ["c", "cc", "cpp", "cxx", "h", "hh", "hpp", "hxx", "inl"]
ignore_dirs = [".git", "build", "target", "node_modules"]

# Glob patterns, relative to the source root, to skip
exclude = [
    "**/generated/**",
]

respect_gitignore = false

[checks.NoTabs]
tab_width = 4

[checks.SortIncludes]
# Blank lines allowed inside one include block
max_blank_lines = 0

[checks.ExpandTemplates]
open = "${{"
close = "}}"

# Templates expanded by ExpandTemplates, e.g. ${{guard(MP_CORE_H)}}
# [templates.guard]
# params = 1
# body = "#ifndef $1\n#define $1"
"##;

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    let config_path = write_config(Path::new("."), force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to set the source root and checks");
    println!("  2. Run: srctidy check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}

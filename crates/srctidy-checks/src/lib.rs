//! # srctidy-checks
//!
//! Built-in text style checks for srctidy.
//!
//! Every check reads a [`SourceFile`](srctidy_core::SourceFile) and reports
//! findings with byte-range fixes; none of them parse the language.
//!
//! ## Available Checks
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | ST001 | `NoTabs` | Indentation uses spaces, not tabs |
//! | ST002 | `NoTrailingLines` | Files end with a single terminator and no blank lines |
//! | ST003 | `NoTrailingSpaces` | Lines do not end with spaces or tabs |
//! | ST004 | `UnixEOL` | Lines end with LF, not CRLF |
//! | ST005 | `SortIncludes` | Include directives are sorted within each block |
//! | ST006 | `ExpandTemplates` | Template directives are expanded |
//!
//! ## Usage
//!
//! ```ignore
//! use srctidy_checks::checks_for;
//! use srctidy_core::{Config, Runner};
//!
//! let config = Config::from_file("srctidy.toml".as_ref())?;
//! let runner = Runner::builder()
//!     .config(&config)
//!     .checks(checks_for(&config))
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod expand_templates;
mod includes;
mod no_tabs;
mod no_trailing_lines;
mod no_trailing_spaces;
mod registry;
mod sort_includes;
mod templates;
mod unix_eol;

pub use expand_templates::ExpandTemplates;
pub use includes::{
    find_blocks, normalize_target, parse_include, IncludeBlock, IncludeDirective, IncludeKind,
};
pub use no_tabs::{NoTabs, DEFAULT_TAB_WIDTH};
pub use no_trailing_lines::NoTrailingLines;
pub use no_trailing_spaces::NoTrailingSpaces;
pub use registry::{all_checks, checks_for, AnyCheck};
pub use sort_includes::SortIncludes;
pub use templates::{substitute, Directive, ParsedDirective, TemplateError, TemplateSet};
pub use unix_eol::UnixEol;

/// Re-export core types for convenience.
pub use srctidy_core::{Check, CheckKind, Finding, Severity};

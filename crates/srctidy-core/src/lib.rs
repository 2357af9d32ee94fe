//! # srctidy-core
//!
//! Core engine for text-level source style checking.
//!
//! This crate provides the foundational traits and types for building
//! style checkers that operate on raw text rather than a syntax tree. It
//! includes:
//!
//! - [`Check`] trait implemented by every style check
//! - [`SourceFile`] and the line scanners checks are built from
//! - [`TextEdit`] and [`EditSet`] for conflict-checked fixes
//! - [`FileWalker`] for deterministic source tree enumeration
//! - [`Runner`] for scanning and fixing a tree on a worker pool
//! - [`Finding`] and [`RunReport`] for representing results
//!
//! ## Example
//!
//! ```ignore
//! use srctidy_core::{Mode, Runner};
//!
//! let runner = Runner::builder()
//!     .root("./src")
//!     .check(MyCheck::new())
//!     .mode(Mode::Report)
//!     .build()?;
//!
//! let report = runner.run()?;
//! print!("{}", report.format_compact());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregate;
mod check;
mod config;
mod edit;
mod runner;
mod source;
mod types;
mod walker;

pub use aggregate::{rewrite_file, scan_file, FileScan, Rewrite};
pub use check::{Check, Scan};
pub use config::{
    ChecksConfig, Config, ConfigError, ExpandTemplatesConfig, NoTabsConfig, SortIncludesConfig,
    TemplateDef, Tools, WalkerConfig, MAX_TEMPLATE_PARAMS,
};
pub use edit::{EditError, EditSet, TextEdit};
pub use runner::{atomic_write, CancelToken, Mode, RunError, Runner, RunnerBuilder};
pub use source::{
    is_blank, is_horizontal_space, leading_whitespace, split_lines, trailing_blank_start,
    trailing_whitespace_start, LeadingWhitespace, Line, SourceFile, Terminator,
};
pub use types::{
    CheckKind, FileError, FileReport, Finding, Location, RunReport, Severity, Summary,
    UnknownCheck,
};
pub use walker::{FileWalker, WalkItem};

//! Recognition of `#include` / `#import` directives and the blocks they form.

use regex::Regex;
use srctidy_core::Line;
use std::sync::OnceLock;

/// How an include target is quoted.
///
/// The derived order puts local includes before system includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IncludeKind {
    /// `"target"`
    Local,
    /// `<target>`
    System,
}

/// A parsed include directive line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncludeDirective<'a> {
    /// Quoting style.
    pub kind: IncludeKind,
    /// Target between the quotes or brackets, as written.
    pub target: &'a str,
}

impl IncludeDirective<'_> {
    /// Sort key without the positional tie-breaker.
    #[must_use]
    pub fn key(&self) -> (IncludeKind, String) {
        (self.kind, normalize_target(self.target))
    }
}

#[allow(clippy::expect_used)]
fn directive_regex() -> &'static Regex {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE.get_or_init(|| {
        Regex::new(r#"^[ \t]*#[ \t]*(?:include|import)[ \t]*(?:"([^"]*)"|<([^>]*)>)"#)
            .expect("include directive regex must compile")
    })
}

/// Parses a line's content as an include directive.
///
/// Leading whitespace and whitespace after `#` are allowed. Anything after
/// the closing quote or bracket (typically a comment) is ignored here and
/// stays with the line when it moves.
#[must_use]
pub fn parse_include(content: &str) -> Option<IncludeDirective<'_>> {
    let captures = directive_regex().captures(content)?;
    if let Some(local) = captures.get(1) {
        return Some(IncludeDirective {
            kind: IncludeKind::Local,
            target: local.as_str(),
        });
    }
    captures.get(2).map(|system| IncludeDirective {
        kind: IncludeKind::System,
        target: system.as_str(),
    })
}

/// Normalizes a target for comparison: backslashes become slashes and a
/// leading `./` is dropped.
#[must_use]
pub fn normalize_target(target: &str) -> String {
    let target = target.replace('\\', "/");
    match target.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => target,
    }
}

/// A run of include directives, possibly with a few blank lines inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeBlock {
    /// 0-based index of the first line.
    pub first: usize,
    /// 0-based index of the last line (always a directive).
    pub last: usize,
    /// 0-based indices of the directive lines, in file order.
    pub slots: Vec<usize>,
}

/// Finds maximal include blocks.
///
/// Up to `max_blank_lines` consecutive blank lines between two directives
/// keep them in the same block; any other line ends the block.
#[must_use]
pub fn find_blocks(lines: &[Line], max_blank_lines: usize) -> Vec<IncludeBlock> {
    let is_directive = |i: usize| parse_include(&lines[i].content).is_some();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if !is_directive(i) {
            i += 1;
            continue;
        }

        let mut block = IncludeBlock {
            first: i,
            last: i,
            slots: vec![i],
        };
        loop {
            let mut next = block.last + 1;
            while next < lines.len()
                && next - block.last - 1 < max_blank_lines
                && lines[next].is_blank()
            {
                next += 1;
            }
            if next < lines.len() && is_directive(next) {
                block.last = next;
                block.slots.push(next);
            } else {
                break;
            }
        }

        i = block.last + 1;
        blocks.push(block);
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use srctidy_core::split_lines;

    #[test]
    fn test_parses_local_and_system_includes() {
        assert_eq!(
            parse_include("#include \"a.h\""),
            Some(IncludeDirective {
                kind: IncludeKind::Local,
                target: "a.h"
            })
        );
        assert_eq!(
            parse_include("  #  import <Foundation/Foundation.h> // objc"),
            Some(IncludeDirective {
                kind: IncludeKind::System,
                target: "Foundation/Foundation.h"
            })
        );
    }

    #[test]
    fn test_rejects_other_lines() {
        for content in [
            "#define X 1",
            "// #include <a.h>",
            "#include MACRO",
            "#includes <a.h>",
        ] {
            assert_eq!(parse_include(content), None, "{content}");
        }
    }

    #[test]
    fn test_normalizes_targets() {
        assert_eq!(normalize_target("./a/b.h"), "a/b.h");
        assert_eq!(normalize_target("a\\b.h"), "a/b.h");
        assert_eq!(normalize_target(".\\b.h"), "b.h");
    }

    #[test]
    fn test_blank_lines_split_blocks_by_default() {
        let lines = split_lines("#include <b>\n#include <a>\n\n#include <c>\nint x;\n");
        let blocks = find_blocks(&lines, 0);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].slots, vec![0, 1]);
        assert_eq!(blocks[1].slots, vec![3]);
    }

    #[test]
    fn test_blank_lines_within_tolerance_join_blocks() {
        let lines = split_lines("#include <b>\n\n#include <a>\n\n\n#include <c>\n");
        let blocks = find_blocks(&lines, 1);
        assert_eq!(
            blocks,
            vec![
                IncludeBlock {
                    first: 0,
                    last: 2,
                    slots: vec![0, 2]
                },
                IncludeBlock {
                    first: 5,
                    last: 5,
                    slots: vec![5]
                },
            ]
        );
    }
}

//! Template directive parsing and placeholder substitution.
//!
//! A directive is `<open>NAME<close>` or `<open>NAME(ARG, ...)<close>`.
//! Arguments split on commas at parenthesis depth zero outside double
//! quoted strings, and are trimmed.

use srctidy_core::TemplateDef;
use std::collections::BTreeMap;
use std::ops::Range;
use thiserror::Error;

/// Errors found while parsing or resolving a directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// No template with this name is configured.
    #[error("unknown template `{0}`")]
    Unknown(String),

    /// A fixed-arity template got the wrong number of arguments.
    #[error("template `{name}` takes {expected} argument(s), got {found}")]
    Arity {
        /// Template name.
        name: String,
        /// Declared parameter count.
        expected: usize,
        /// Arguments supplied.
        found: usize,
    },

    /// The directive runs to the end of the file.
    #[error("unterminated directive, expected `{0}`")]
    Unterminated(String),

    /// The directive is not of the form `NAME` or `NAME(ARGS)`.
    #[error("malformed directive: {0}")]
    Malformed(String),
}

/// A directive found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Bytes covered by the directive, markers included.
    pub span: Range<usize>,
    /// Template name.
    pub name: String,
    /// Trimmed arguments.
    pub args: Vec<String>,
}

/// A directive or the error that stopped it from parsing, with the byte
/// offset of its open marker.
pub type ParsedDirective = Result<Directive, (usize, TemplateError)>;

/// Configured templates plus the directive markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    open: String,
    close: String,
    templates: BTreeMap<String, TemplateDef>,
}

impl TemplateSet {
    /// Creates a set using the given markers.
    #[must_use]
    pub fn new(
        open: impl Into<String>,
        close: impl Into<String>,
        templates: BTreeMap<String, TemplateDef>,
    ) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
            templates,
        }
    }

    /// Open marker.
    #[must_use]
    pub fn open(&self) -> &str {
        &self.open
    }

    /// Number of configured templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no templates are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Finds every directive in `text`, left to right.
    ///
    /// An unterminated directive ends the scan, since everything after it
    /// would be inside it.
    #[must_use]
    pub fn parse(&self, text: &str) -> Vec<ParsedDirective> {
        let mut found = Vec::new();
        let mut pos = 0;
        if self.open.is_empty() || self.close.is_empty() {
            return found;
        }
        while let Some(offset) = text[pos..].find(&self.open) {
            let start = pos + offset;
            match self.parse_at(text, start) {
                Ok(directive) => {
                    pos = directive.span.end;
                    found.push(Ok(directive));
                }
                Err(e @ TemplateError::Unterminated(_)) => {
                    found.push(Err((start, e)));
                    break;
                }
                Err(e) => {
                    // Resume after this directive's close marker.
                    let body = start + self.open.len();
                    pos = text[body..]
                        .find(&self.close)
                        .map_or(body, |i| body + i + self.close.len());
                    found.push(Err((start, e)));
                }
            }
        }
        found
    }

    fn parse_at(&self, text: &str, start: usize) -> Result<Directive, TemplateError> {
        let unterminated = || TemplateError::Unterminated(self.close.clone());
        let mut pos = skip_space(text, start + self.open.len());

        let name_len = text[pos..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(text.len() - pos);
        let name = &text[pos..pos + name_len];
        if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            return if text[pos..].contains(&self.close) {
                Err(TemplateError::Malformed("expected a template name".to_string()))
            } else {
                Err(unterminated())
            };
        }
        pos = skip_space(text, pos + name_len);

        let mut args = Vec::new();
        if text[pos..].starts_with('(') {
            let (parsed, end) = split_args(text, pos + 1).ok_or_else(unterminated)?;
            args = parsed;
            pos = skip_space(text, end);
        }

        if text[pos..].starts_with(&self.close) {
            return Ok(Directive {
                span: start..pos + self.close.len(),
                name: name.to_string(),
                args,
            });
        }
        if text[pos..].contains(&self.close) {
            Err(TemplateError::Malformed(format!(
                "unexpected text before `{}`",
                self.close
            )))
        } else {
            Err(unterminated())
        }
    }

    /// Resolves a directive to its expansion.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Unknown`] or [`TemplateError::Arity`].
    pub fn expand(&self, directive: &Directive) -> Result<String, TemplateError> {
        let def = self
            .templates
            .get(&directive.name)
            .ok_or_else(|| TemplateError::Unknown(directive.name.clone()))?;
        if let Some(expected) = def.fixed_arity() {
            if expected != directive.args.len() {
                return Err(TemplateError::Arity {
                    name: directive.name.clone(),
                    expected,
                    found: directive.args.len(),
                });
            }
        }
        Ok(substitute(&def.body, &directive.args))
    }
}

fn skip_space(text: &str, pos: usize) -> usize {
    pos + text[pos..].len() - text[pos..].trim_start_matches([' ', '\t']).len()
}

/// Splits an argument list starting just after `(`. Returns the arguments
/// and the offset just past the matching `)`, or `None` if the list or a
/// string inside it never closes.
fn split_args(text: &str, start: usize) -> Option<(Vec<String>, usize)> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut arg_start = start;

    for (i, c) in text[start..].char_indices() {
        let at = start + i;
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            ')' => {
                let last = text[arg_start..at].trim();
                if !(args.is_empty() && last.is_empty()) {
                    args.push(last.to_string());
                }
                return Some((args, at + 1));
            }
            ',' if depth == 0 => {
                args.push(text[arg_start..at].trim().to_string());
                arg_start = at + 1;
            }
            _ => {}
        }
    }
    None
}

/// Replaces `$1`..`$9`, `$@`, `$#` and `$$` in `body`. Other `$` sequences
/// are copied as written. The result is never rescanned.
#[must_use]
pub fn substitute(body: &str, args: &[String]) -> String {
    let mut output = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            output.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(d @ '1'..='9') => {
                chars.next();
                let index = d as usize - '1' as usize;
                if let Some(arg) = args.get(index) {
                    output.push_str(arg);
                }
            }
            Some('@') => {
                chars.next();
                output.push_str(&args.join(", "));
            }
            Some('#') => {
                chars.next();
                output.push_str(&args.len().to_string());
            }
            Some('$') => {
                chars.next();
                output.push('$');
            }
            _ => output.push('$'),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> TemplateSet {
        let mut templates = BTreeMap::new();
        templates.insert(
            "guard".to_string(),
            TemplateDef {
                body: "#ifndef $1\n#define $1".to_string(),
                params: Some(1),
                variadic: false,
            },
        );
        templates.insert(
            "list".to_string(),
            TemplateDef {
                body: "{$@} /* $# */".to_string(),
                params: None,
                variadic: true,
            },
        );
        TemplateSet::new("${{", "}}", templates)
    }

    fn directives(text: &str) -> Vec<Directive> {
        set().parse(text).into_iter().map(Result::unwrap).collect()
    }

    #[test]
    fn test_parses_name_and_args() {
        let found = directives("x ${{ guard(FOO_H) }} y ${{list}}");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "guard");
        assert_eq!(found[0].args, vec!["FOO_H"]);
        assert_eq!(found[0].span, 2..21);
        assert_eq!(found[1].name, "list");
        assert!(found[1].args.is_empty());
    }

    #[test]
    fn test_args_respect_parens_and_strings() {
        let found = directives(r#"${{list(f(a, b), "x, \"y\"", c)}}"#);
        assert_eq!(found[0].args, vec!["f(a, b)", r#""x, \"y\"""#, "c"]);
    }

    #[test]
    fn test_empty_arg_list_has_no_args() {
        assert!(directives("${{list( )}}")[0].args.is_empty());
    }

    #[test]
    fn test_unterminated_directive_stops_scan() {
        let parsed = set().parse("ok ${{guard(A) and ${{guard(B)}}");
        assert_eq!(parsed.len(), 1);
        assert!(matches!(parsed[0], Err((3, TemplateError::Malformed(_)))));

        let parsed = set().parse("${{guard(A");
        assert!(matches!(parsed[0], Err((0, TemplateError::Unterminated(_)))));
    }

    #[test]
    fn test_malformed_directive_resumes_after_close() {
        let parsed = set().parse("${{ 1bad }} ${{list}}");
        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].is_err());
        assert!(parsed[1].is_ok());
    }

    #[test]
    fn test_expand_checks_name_and_arity() {
        let set = set();
        let unknown = directives("${{nope}}").remove(0);
        assert_eq!(
            set.expand(&unknown),
            Err(TemplateError::Unknown("nope".to_string()))
        );
        let wrong = directives("${{guard(A, B)}}").remove(0);
        assert!(matches!(
            set.expand(&wrong),
            Err(TemplateError::Arity {
                expected: 1,
                found: 2,
                ..
            })
        ));
        let ok = directives("${{guard(A_H)}}").remove(0);
        assert_eq!(set.expand(&ok).unwrap(), "#ifndef A_H\n#define A_H");
    }

    #[test]
    fn test_substitute_placeholders() {
        let args = vec!["a".to_string(), "b".to_string()];
        assert_eq!(substitute("$2$1 $@ $# $$1 $x $9", &args), "ba a, b 2 $1 $x ");
    }
}

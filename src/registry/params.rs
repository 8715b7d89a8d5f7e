//! registry::params
//!
//! Parameter specifications and the argument parser.
//!
//! # Parsing Rules
//!
//! The trailing text of an input line is tokenized with shell quoting
//! rules, then gated by the command's [`ParamSpec`]:
//!
//! - `None`: no tokens are returned, extra input is ignored
//! - `Variadic`: all tokens, in order
//! - `List`: fails if fewer tokens than required entries, else all tokens
//! - `SingleOptional`: all tokens (zero or more)
//! - `SingleRequired`: fails on zero tokens, else only the first token
//!
//! The parser never binds tokens to parameter names. A handler with several
//! optional slots associates trailing tokens positionally itself.
//!
//! # Example
//!
//! ```
//! use pcshell::registry::params::{Param, ParamSpec};
//!
//! let spec = ParamSpec::List(vec![Param::required("pattern"), Param::required("file")]);
//! let tokens = spec.parse(r#""foo bar" file.txt"#).unwrap();
//! assert_eq!(tokens, vec!["foo bar", "file.txt"]);
//! assert_eq!(spec.usage(), "<pattern> <file>");
//! ```

use std::borrow::Cow;

use serde::Deserialize;
use thiserror::Error;

/// Declaration marker for a variadic parameter list.
pub const VARIADIC_MARKER: &str = "*argv";

/// Errors from argument parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("insufficient arguments, need at least {required}")]
    InsufficientArguments { required: usize },

    #[error("argument required")]
    ArgumentRequired,

    #[error("unterminated quote in arguments")]
    UnbalancedQuotes,
}

/// One named parameter in a list-typed spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub optional: bool,
}

impl Param {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }

    /// Parse a declared entry. Only `[name]` is optional; the legacy
    /// `?name` prefix is stripped but the entry stays required.
    pub fn from_decl(raw: &str) -> Self {
        if let Some(name) = strip_brackets(raw) {
            Self::optional(name)
        } else {
            Self::required(raw.strip_prefix('?').unwrap_or(raw))
        }
    }

    fn usage(&self) -> String {
        if self.optional {
            format!("[{}]", self.name)
        } else {
            format!("<{}>", self.name)
        }
    }
}

fn strip_brackets(raw: &str) -> Option<&str> {
    raw.strip_prefix('[').and_then(|s| s.strip_suffix(']'))
}

/// The `para` field as it appears in the declaration table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawParams {
    One(String),
    Many(Vec<String>),
}

/// What arguments a command accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParamSpec {
    /// No arguments.
    #[default]
    None,
    /// Unbounded ordered sequence.
    Variadic,
    /// Named entries, each required or optional.
    List(Vec<Param>),
    /// A single optional argument.
    SingleOptional(String),
    /// A single required argument.
    SingleRequired(String),
}

impl ParamSpec {
    /// Build a spec from the declaration table's `para` field.
    pub fn from_decl(raw: Option<&RawParams>) -> Self {
        match raw {
            None => ParamSpec::None,
            Some(RawParams::One(s)) if s.is_empty() => ParamSpec::None,
            Some(RawParams::One(s)) if s == VARIADIC_MARKER => ParamSpec::Variadic,
            Some(RawParams::One(s)) => match strip_brackets(s) {
                Some(name) => ParamSpec::SingleOptional(name.to_string()),
                None => ParamSpec::SingleRequired(s.clone()),
            },
            Some(RawParams::Many(entries)) if entries.is_empty() => ParamSpec::None,
            Some(RawParams::Many(entries)) => {
                ParamSpec::List(entries.iter().map(|e| Param::from_decl(e)).collect())
            }
        }
    }

    /// Minimum number of tokens this spec accepts.
    pub fn required_count(&self) -> usize {
        match self {
            ParamSpec::List(params) => params.iter().filter(|p| !p.optional).count(),
            ParamSpec::SingleRequired(_) => 1,
            _ => 0,
        }
    }

    /// Usage fragment synthesized from the spec, e.g. `<key> [value]`.
    pub fn usage(&self) -> String {
        match self {
            ParamSpec::None => String::new(),
            ParamSpec::Variadic => "<arg1> [arg2] ...".to_string(),
            ParamSpec::List(params) => params
                .iter()
                .map(Param::usage)
                .collect::<Vec<_>>()
                .join(" "),
            ParamSpec::SingleOptional(name) => format!("[{}]", name),
            ParamSpec::SingleRequired(name) => format!("<{}>", name),
        }
    }

    /// Turn trailing input text into the token sequence handed to a handler.
    pub fn parse(&self, raw: &str) -> Result<Vec<String>, ParseError> {
        if *self == ParamSpec::None {
            return Ok(Vec::new());
        }

        let tokens = tokenize(raw)?;

        match self {
            ParamSpec::None => Ok(Vec::new()),
            ParamSpec::Variadic | ParamSpec::SingleOptional(_) => Ok(tokens),
            ParamSpec::List(_) => {
                let required = self.required_count();
                if tokens.len() < required {
                    return Err(ParseError::InsufficientArguments { required });
                }
                Ok(tokens)
            }
            ParamSpec::SingleRequired(_) => {
                let first = tokens.into_iter().next().ok_or(ParseError::ArgumentRequired)?;
                Ok(vec![first])
            }
        }
    }
}

/// Split text into tokens with POSIX-like quoting.
///
/// Unquoted whitespace separates tokens; single and double quotes group.
/// Whitespace-only input yields no tokens. `#` is an ordinary character,
/// never the start of a comment.
pub fn tokenize(raw: &str) -> Result<Vec<String>, ParseError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    shlex::split(&escape_comment_marks(raw)).ok_or(ParseError::UnbalancedQuotes)
}

/// Backslash-escape every unquoted `#` that begins a word.
///
/// `shlex` drops the rest of the line at such a `#`.
fn escape_comment_marks(raw: &str) -> Cow<'_, str> {
    if !raw.contains('#') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len() + 4);
    let mut quote: Option<char> = None;
    let mut word_start = true;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                } else if c == '\\' && q == '"' {
                    out.extend(chars.next());
                }
            }
            None => {
                if word_start && c == '#' {
                    out.push('\\');
                }
                out.push(c);
                word_start = matches!(c, ' ' | '\t' | '\n');
                match c {
                    '\'' | '"' => quote = Some(c),
                    '\\' => out.extend(chars.next()),
                    _ => {}
                }
            }
        }
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[&str]) -> ParamSpec {
        ParamSpec::List(entries.iter().map(|e| Param::from_decl(e)).collect())
    }

    #[test]
    fn tokenize_groups_quotes() {
        assert_eq!(
            tokenize(r#"grep "a b" file.txt"#).unwrap(),
            vec!["grep", "a b", "file.txt"]
        );
        assert_eq!(tokenize("'x  y' z").unwrap(), vec!["x  y", "z"]);
    }

    #[test]
    fn tokenize_keeps_hash_literal() {
        assert_eq!(tokenize("a #b c").unwrap(), vec!["a", "#b", "c"]);
        assert_eq!(tokenize("#include f.c").unwrap(), vec!["#include", "f.c"]);
        assert_eq!(tokenize("x#y '#z' \"#w\"").unwrap(), vec!["x#y", "#z", "#w"]);
        assert_eq!(tokenize(r"\#a").unwrap(), vec!["#a"]);
    }

    #[test]
    fn tokenize_whitespace_only_is_empty() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   \t ").unwrap().is_empty());
    }

    #[test]
    fn tokenize_rejects_unterminated_quote() {
        assert_eq!(tokenize("\"abc"), Err(ParseError::UnbalancedQuotes));
    }

    #[test]
    fn none_ignores_everything() {
        assert!(ParamSpec::None.parse("a b c").unwrap().is_empty());
        assert!(ParamSpec::None.parse("\"unterminated").unwrap().is_empty());
    }

    #[test]
    fn variadic_returns_all_tokens() {
        assert_eq!(
            ParamSpec::Variadic.parse("one 'two three' four").unwrap(),
            vec!["one", "two three", "four"]
        );
        assert!(ParamSpec::Variadic.parse("").unwrap().is_empty());
    }

    #[test]
    fn list_gates_minimum_count_only() {
        let spec = list(&["required1", "[optional1]", "required2"]);
        assert_eq!(spec.required_count(), 2);
        assert_eq!(
            spec.parse("a"),
            Err(ParseError::InsufficientArguments { required: 2 })
        );
        assert_eq!(spec.parse("a b").unwrap(), vec!["a", "b"]);
        assert_eq!(spec.parse("a b c d").unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn legacy_question_mark_entry_is_still_required() {
        let spec = list(&["src", "?dest"]);
        assert_eq!(spec.required_count(), 2);
        assert_eq!(
            spec.parse("a"),
            Err(ParseError::InsufficientArguments { required: 2 })
        );
        assert_eq!(spec.parse("a b").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn list_of_optionals_accepts_nothing() {
        let spec = list(&["[source]", "[destination]"]);
        assert!(spec.parse("").unwrap().is_empty());
    }

    #[test]
    fn single_optional_returns_all_tokens() {
        let spec = ParamSpec::SingleOptional("path".into());
        assert!(spec.parse("  ").unwrap().is_empty());
        assert_eq!(spec.parse("a b").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn single_required_takes_first_token() {
        let spec = ParamSpec::SingleRequired("name".into());
        assert_eq!(spec.parse(""), Err(ParseError::ArgumentRequired));
        assert_eq!(spec.parse("   "), Err(ParseError::ArgumentRequired));
        assert_eq!(spec.parse("x y z").unwrap(), vec!["x"]);
    }

    #[test]
    fn from_decl_variants() {
        assert_eq!(ParamSpec::from_decl(None), ParamSpec::None);
        assert_eq!(
            ParamSpec::from_decl(Some(&RawParams::One(String::new()))),
            ParamSpec::None
        );
        assert_eq!(
            ParamSpec::from_decl(Some(&RawParams::One("*argv".into()))),
            ParamSpec::Variadic
        );
        assert_eq!(
            ParamSpec::from_decl(Some(&RawParams::One("[path]".into()))),
            ParamSpec::SingleOptional("path".into())
        );
        assert_eq!(
            ParamSpec::from_decl(Some(&RawParams::One("path".into()))),
            ParamSpec::SingleRequired("path".into())
        );
        assert_eq!(
            ParamSpec::from_decl(Some(&RawParams::Many(vec!["a".into(), "?b".into()]))),
            ParamSpec::List(vec![Param::required("a"), Param::required("b")])
        );
    }

    #[test]
    fn usage_strings() {
        assert_eq!(ParamSpec::None.usage(), "");
        assert_eq!(ParamSpec::Variadic.usage(), "<arg1> [arg2] ...");
        assert_eq!(list(&["key", "[value]"]).usage(), "<key> [value]");
        assert_eq!(list(&["a", "?b"]).usage(), "<a> <b>");
        assert_eq!(ParamSpec::SingleOptional("p".into()).usage(), "[p]");
        assert_eq!(ParamSpec::SingleRequired("p".into()).usage(), "<p>");
    }
}

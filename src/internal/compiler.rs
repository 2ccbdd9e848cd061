//! Module with the pattern compiler.
//!
//! A rule pattern, literal or regex, is normalized, expanded against the
//! named definitions and compiled into a matcher that is evaluated at an
//! absolute input offset.

use std::collections::HashMap;

use log::trace;
use regex_automata::{meta::Regex, util::syntax, Anchored, Input};

use crate::{
    errors::{FlxError, FlxErrorKind, Result},
    Expression,
};

/// A compiled rule pattern.
///
/// The matcher behaves as if the pattern were required to match at exactly
/// the offset handed to [CompiledPattern::match_len_at]. `^` holds at offset
/// zero or right after a line feed, `$` holds right before a line feed or at
/// the end of the input.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPattern {
    regex: Regex,
    source: String,
    has_bol: bool,
    has_eol: bool,
    fixed_width: Option<usize>,
}

impl CompiledPattern {
    /// The byte length of the match beginning exactly at `at`, if any.
    pub(crate) fn match_len_at(&self, haystack: &str, at: usize) -> Option<usize> {
        let input = Input::new(haystack).range(at..).anchored(Anchored::Yes);
        self.regex.find(input).map(|m| m.len())
    }

    /// The expanded pattern source.
    #[inline]
    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    /// Whether the original pattern began with `^`.
    #[inline]
    pub(crate) fn has_bol(&self) -> bool {
        self.has_bol
    }

    /// Whether the original pattern ended with `$`.
    #[inline]
    pub(crate) fn has_eol(&self) -> bool {
        self.has_eol
    }

    /// The exact match width of a literal pattern. Regex patterns have none.
    #[inline]
    pub(crate) fn fixed_width(&self) -> Option<usize> {
        self.fixed_width
    }
}

/// Check a definition or state name against the name grammar
/// `[A-Za-z_][A-Za-z0-9_-]*`.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FlxError::new(FlxErrorKind::InvalidName(name.to_string())))
    }
}

/// Substitute every `{name}` occurrence with the parenthesized body of the
/// definition registered under that name.
///
/// The brace-name scan is case-insensitive on the name while the lookup is
/// exact; names without a registered definition are left verbatim. A brace
/// preceded by a backslash is escaped and never expanded, so quantifiers like
/// `a{2,3}` pass through untouched because their body fails the name grammar.
pub(crate) fn expand_definitions(source: &str, definitions: &HashMap<String, String>) -> String {
    let mut expanded = String::with_capacity(source.len());
    let mut iter = source.char_indices().peekable();
    let mut escaped = false;
    while let Some((at, c)) = iter.next() {
        if escaped {
            expanded.push(c);
            escaped = false;
            continue;
        }
        if c == '\\' {
            expanded.push(c);
            escaped = true;
            continue;
        }
        if c == '{' {
            if let Some((name, width)) = parse_braced_name(&source[at..]) {
                if let Some(body) = definitions.get(name) {
                    trace!("Expand definition '{}' in '{}'", name, source.escape_default());
                    expanded.push_str("(?:");
                    expanded.push_str(body);
                    expanded.push(')');
                } else {
                    expanded.push_str(&source[at..at + width]);
                }
                while iter.peek().is_some_and(|(next, _)| *next < at + width) {
                    iter.next();
                }
                continue;
            }
        }
        expanded.push(c);
    }
    expanded
}

/// Parse a leading `{name}` out of `s` and return the name together with the
/// byte width of the whole braced reference.
fn parse_braced_name(s: &str) -> Option<(&str, usize)> {
    let inner = &s[1..];
    let close = inner.find('}')?;
    let name = &inner[..close];
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    Some((name, close + 2))
}

/// True when the pattern ends in an unescaped `$`.
fn has_trailing_anchor(source: &str) -> bool {
    if !source.ends_with('$') {
        return false;
    }
    let body = &source[..source.len() - 1];
    body.chars().rev().take_while(|c| *c == '\\').count() % 2 == 0
}

/// Compile an expression into an anchored matcher.
///
/// Literal strings are escaped wholesale and record their exact width; regex
/// sources are expanded against the definitions and may carry the flags `i`
/// and `u`. The scanner-wide case setting folds into the pattern's own `i`
/// flag. Anchors are detected at the syntactic extremes only; they stay in
/// the compiled source and are evaluated by the regex engine with multi-line
/// semantics.
pub(crate) fn compile(
    expression: &Expression,
    definitions: &HashMap<String, String>,
    ignore_case: bool,
) -> Result<CompiledPattern> {
    let (source, case_insensitive, fixed_width) = match expression {
        Expression::Literal(literal) => {
            if literal.is_empty() {
                return Err(FlxError::new(FlxErrorKind::EmptyPattern));
            }
            (regex_syntax::escape(literal), ignore_case, Some(literal.len()))
        }
        Expression::Regex { source, flags } => {
            if source.is_empty() {
                return Err(FlxError::new(FlxErrorKind::EmptyPattern));
            }
            let mut case_insensitive = ignore_case;
            for flag in flags.chars() {
                match flag {
                    'i' => case_insensitive = true,
                    // The engine is always unicode; the flag is accepted for
                    // compatibility.
                    'u' => {}
                    other => {
                        return Err(FlxError::new(FlxErrorKind::UnsupportedFlag(
                            other,
                            source.clone(),
                        )))
                    }
                }
            }
            (
                expand_definitions(source, definitions),
                case_insensitive,
                None,
            )
        }
        Expression::EndOfFile => unreachable!("end-of-file rules have no pattern"),
    };

    let has_bol = source.starts_with('^');
    let has_eol = has_trailing_anchor(&source);

    let regex = Regex::builder()
        .syntax(
            syntax::Config::new()
                .multi_line(true)
                .case_insensitive(case_insensitive)
                .unicode(true),
        )
        .build(&source)
        .map_err(|e| FlxError::new(FlxErrorKind::InvalidPattern(e, source.clone())))?;
    trace!("Compiled pattern '{}'", source.escape_default());

    Ok(CompiledPattern {
        regex,
        source,
        has_bol,
        has_eol,
        fixed_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn no_definitions() -> HashMap<String, String> {
        HashMap::new()
    }

    fn digit_definitions() -> HashMap<String, String> {
        let mut definitions = HashMap::new();
        definitions.insert("DIGIT".to_string(), "[0-9]".to_string());
        definitions
    }

    #[test]
    fn test_expand_definitions() {
        init();
        let definitions = digit_definitions();
        assert_eq!(
            expand_definitions(r"{DIGIT}+\.{DIGIT}+", &definitions),
            r"(?:[0-9])+\.(?:[0-9])+"
        );
        // The lookup is exact, so a differently cased reference stays verbatim.
        assert_eq!(expand_definitions("{digit}+", &definitions), "{digit}+");
        assert_eq!(expand_definitions("{UNKNOWN}", &definitions), "{UNKNOWN}");
        // Escaped braces and quantifiers pass through untouched.
        assert_eq!(expand_definitions(r"\{DIGIT}", &definitions), r"\{DIGIT}");
        assert_eq!(expand_definitions("a{2,3}", &definitions), "a{2,3}");
    }

    #[test]
    fn test_literal_escape_and_width() {
        init();
        let pattern = compile(&Expression::literal("a.b*"), &no_definitions(), false).unwrap();
        assert_eq!(pattern.fixed_width(), Some(4));
        assert_eq!(pattern.match_len_at("a.b*", 0), Some(4));
        assert_eq!(pattern.match_len_at("axbb", 0), None);
        assert!(!pattern.has_bol());
        assert!(!pattern.has_eol());
    }

    #[test]
    fn test_literal_anchors_are_not_anchors() {
        init();
        let pattern = compile(&Expression::literal("^a$"), &no_definitions(), false).unwrap();
        assert!(!pattern.has_bol());
        assert!(!pattern.has_eol());
        assert_eq!(pattern.match_len_at("^a$", 0), Some(3));
    }

    #[test]
    fn test_anchor_detection() {
        init();
        let pattern = compile(&Expression::regex("^ab$"), &no_definitions(), false).unwrap();
        assert!(pattern.has_bol());
        assert!(pattern.has_eol());

        let pattern = compile(&Expression::regex(r"ab\$"), &no_definitions(), false).unwrap();
        assert!(!pattern.has_eol());
        assert_eq!(pattern.match_len_at("ab$", 0), Some(3));
    }

    #[test]
    fn test_anchored_at_offset() {
        init();
        let pattern = compile(&Expression::regex("[a-z]+"), &no_definitions(), false).unwrap();
        // The match must begin exactly at the offset, not later.
        assert_eq!(pattern.match_len_at("01abc", 0), None);
        assert_eq!(pattern.match_len_at("01abc", 2), Some(3));
    }

    #[test]
    fn test_bol_after_line_feed() {
        init();
        let pattern = compile(&Expression::regex("^b+"), &no_definitions(), false).unwrap();
        assert_eq!(pattern.match_len_at("bb", 0), Some(2));
        assert_eq!(pattern.match_len_at("a\nbb", 2), Some(2));
        assert_eq!(pattern.match_len_at("abb", 1), None);
    }

    #[test]
    fn test_eol_before_line_feed() {
        init();
        let pattern = compile(&Expression::regex("b+$"), &no_definitions(), false).unwrap();
        assert_eq!(pattern.match_len_at("abb", 1), Some(2));
        assert_eq!(pattern.match_len_at("abb\nc", 1), Some(2));
        assert_eq!(pattern.match_len_at("abbc", 1), None);
    }

    #[test]
    fn test_flags() {
        init();
        let pattern =
            compile(&Expression::regex_with_flags("abc", "iu"), &no_definitions(), false).unwrap();
        assert_eq!(pattern.match_len_at("ABC", 0), Some(3));

        let err = compile(&Expression::regex_with_flags("abc", "g"), &no_definitions(), false)
            .unwrap_err();
        assert!(matches!(*err.source, FlxErrorKind::UnsupportedFlag('g', _)));
    }

    #[test]
    fn test_scanner_wide_ignore_case() {
        init();
        let pattern = compile(&Expression::literal("select"), &no_definitions(), true).unwrap();
        assert_eq!(pattern.match_len_at("SELECT", 0), Some(6));
    }

    #[test]
    fn test_empty_pattern() {
        init();
        let err = compile(&Expression::literal(""), &no_definitions(), false).unwrap_err();
        assert!(matches!(*err.source, FlxErrorKind::EmptyPattern));
        let err = compile(&Expression::regex(""), &no_definitions(), false).unwrap_err();
        assert!(matches!(*err.source, FlxErrorKind::EmptyPattern));
    }

    #[test]
    fn test_invalid_pattern() {
        init();
        let err = compile(&Expression::regex("(a"), &no_definitions(), false).unwrap_err();
        assert!(matches!(*err.source, FlxErrorKind::InvalidPattern(_, _)));
    }

    #[test]
    fn test_validate_name() {
        init();
        assert!(validate_name("DIGIT").is_ok());
        assert!(validate_name("_a-1").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("1abc").is_err());
        assert!(validate_name("*").is_err());
        assert!(validate_name("a b").is_err());
    }
}

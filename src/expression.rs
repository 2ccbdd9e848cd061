//! Module with the expression type rule patterns are made of.
use serde::{Deserialize, Serialize};

/// The pattern sentinel that declares an end-of-file rule.
/// It is accepted wherever a pattern is expected.
pub const RULE_EOF: &str = "<<EOF>>";

/// A rule pattern as provided by the caller.
///
/// A literal string is matched verbatim; all regex metacharacters in it are
/// neutralized at compile time. A regex carries its source and an optional
/// flag set, where only `i` (case-insensitive) and `u` (unicode) are
/// permitted. The end-of-file variant declares a rule that is dispatched when
/// the cursor has reached the end of the input instead of matching text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    /// A literal string, matched verbatim.
    Literal(String),
    /// A regular expression.
    Regex {
        /// The regex source. Occurrences of `{name}` are expanded against the
        /// scanner's definitions at rule-compile time.
        source: String,
        /// The regex flags, any combination of `i` and `u`.
        flags: String,
    },
    /// The end-of-file rule sentinel.
    EndOfFile,
}

impl Expression {
    /// Create a literal expression.
    pub fn literal(literal: impl Into<String>) -> Self {
        Expression::Literal(literal.into())
    }

    /// Create a regex expression without flags.
    pub fn regex(source: impl Into<String>) -> Self {
        Expression::Regex {
            source: source.into(),
            flags: String::new(),
        }
    }

    /// Create a regex expression with flags.
    pub fn regex_with_flags(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Expression::Regex {
            source: source.into(),
            flags: flags.into(),
        }
    }

    /// Check if the expression is the end-of-file sentinel.
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, Expression::EndOfFile)
    }
}

impl From<&str> for Expression {
    /// The string [RULE_EOF] converts to [Expression::EndOfFile]; every other
    /// string converts to a literal.
    fn from(value: &str) -> Self {
        if value == RULE_EOF {
            Expression::EndOfFile
        } else {
            Expression::Literal(value.to_string())
        }
    }
}

impl From<String> for Expression {
    fn from(value: String) -> Self {
        if value == RULE_EOF {
            Expression::EndOfFile
        } else {
            Expression::Literal(value)
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "\"{}\"", literal.escape_default()),
            Expression::Regex { source, flags } => {
                write!(f, "/{}/{}", source.escape_default(), flags)
            }
            Expression::EndOfFile => write!(f, "{}", RULE_EOF),
        }
    }
}

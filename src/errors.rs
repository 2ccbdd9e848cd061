use thiserror::Error;

/// The result type for the `flx` crate.
pub type Result<T> = std::result::Result<T, FlxError>;

/// The error type for the `flx` crate.
#[derive(Error, Debug)]
pub struct FlxError {
    /// The source of the error.
    pub source: Box<FlxErrorKind>,
}

impl FlxError {
    /// Create a new `FlxError`.
    pub fn new(kind: FlxErrorKind) -> Self {
        FlxError {
            source: Box::new(kind),
        }
    }

    /// Wrap an error raised inside a rule action.
    /// The wrapped error is propagated unchanged to the caller of
    /// [crate::Scanner::lex].
    pub fn user<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        FlxError::new(FlxErrorKind::UserAction(error.into()))
    }
}

impl std::fmt::Display for FlxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl From<FlxErrorKind> for FlxError {
    fn from(kind: FlxErrorKind) -> Self {
        FlxError::new(kind)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum FlxErrorKind {
    /// A definition or state name does not conform to the name grammar
    /// `[A-Za-z_][A-Za-z0-9_-]*`.
    #[error("invalid name '{0}'")]
    InvalidName(String),

    /// The pattern source failed to compile after definition expansion.
    #[error("'{1}' {0}")]
    InvalidPattern(regex_automata::meta::BuildError, String),

    /// A regex flag other than `i` or `u` was used.
    #[error("unsupported regex flag '{0}' in '{1}'")]
    UnsupportedFlag(char, String),

    /// A zero-length literal or regex source.
    #[error("empty pattern")]
    EmptyPattern,

    /// A rule or a state transition references an unregistered start
    /// condition.
    #[error("unknown scanner state '{0}'")]
    UnknownState(String),

    /// A rule's state specifier resolved to the empty set.
    #[error("rule state set resolved to the empty set")]
    EmptyStateSet,

    /// `pop_state` was called on an empty state stack.
    #[error("state stack underflow")]
    StackUnderflow,

    /// An error raised by a user-provided rule action.
    #[error("user action error: {0}")]
    UserAction(Box<dyn std::error::Error + Send + Sync>),
}

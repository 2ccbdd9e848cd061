//! Module with the rule record and the action types.

use std::cell::RefCell;

use crate::{
    context::Context, errors::Result, expression::RULE_EOF, internal::compiler::CompiledPattern,
    Expression,
};

/// A rule action.
///
/// An action receives the action surface of the running scanner and either
/// yields a token with `Ok(Some(..))` or tells the driver to keep scanning
/// with `Ok(None)`. Errors are propagated unchanged to the caller of
/// [crate::Scanner::lex].
pub type Action<T> = Box<dyn FnMut(&mut Context<'_>) -> Result<Option<T>>>;

/// A pattern/action pair for batch registration with
/// [crate::Scanner::add_rules] and [crate::Scanner::add_state_rules].
pub struct RuleDef<T> {
    pub(crate) expression: Expression,
    pub(crate) action: Option<Action<T>>,
}

impl<T> RuleDef<T> {
    /// A rule without an action. The matched input is discarded.
    pub fn new(expression: impl Into<Expression>) -> Self {
        Self {
            expression: expression.into(),
            action: None,
        }
    }

    /// A rule with an action.
    pub fn with<F>(expression: impl Into<Expression>, action: F) -> Self
    where
        F: FnMut(&mut Context<'_>) -> Result<Option<T>> + 'static,
    {
        Self {
            expression: expression.into(),
            action: Some(Box::new(action)),
        }
    }
}

impl<T> std::fmt::Debug for RuleDef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleDef")
            .field("expression", &self.expression)
            .field("action", &self.action.is_some())
            .finish()
    }
}

/// A compiled rule.
///
/// Rules are stored once in the scanner-global rule vector; the vector index
/// is the registration index used for the tie-break, shared by every state
/// the rule is attached to. End-of-file rules carry no pattern; discard rules
/// carry no action.
pub(crate) struct Rule<T> {
    pattern: Option<CompiledPattern>,
    action: Option<RefCell<Action<T>>>,
}

impl<T> Rule<T> {
    pub(crate) fn new(pattern: Option<CompiledPattern>, action: Option<Action<T>>) -> Self {
        Self {
            pattern,
            action: action.map(RefCell::new),
        }
    }

    #[inline]
    pub(crate) fn pattern(&self) -> Option<&CompiledPattern> {
        self.pattern.as_ref()
    }

    #[inline]
    pub(crate) fn action(&self) -> Option<&RefCell<Action<T>>> {
        self.action.as_ref()
    }

    /// The pattern source for traces; end-of-file rules report the sentinel.
    pub(crate) fn pattern_source(&self) -> &str {
        self.pattern
            .as_ref()
            .map(|pattern| pattern.source())
            .unwrap_or(RULE_EOF)
    }
}

impl<T> std::fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern_source())
            .field("action", &self.action.is_some())
            .finish()
    }
}

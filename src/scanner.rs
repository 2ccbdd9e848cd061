//! Module with the scanner: the configuration surface and the scan driver.

use std::collections::HashMap;

use log::trace;

use crate::{
    context::Context,
    errors::{FlxError, FlxErrorKind, Result},
    internal::{
        compiler,
        runtime::{Hooks, ScanState},
        selector,
    },
    rule::{Action, Rule, RuleDef},
    state::{StateRegistry, StateSpec},
    Expression,
};

/// The outcome of a single driver pass.
enum Scan<T> {
    /// The action produced a token.
    Token(T),
    /// Input was consumed without producing a token.
    Nothing,
    /// The end of the input was reached or the scan was terminated.
    Eof,
}

/// A runtime-configurable lexical scanner.
///
/// A scanner is assembled at runtime from named definitions, start conditions
/// and rules, then driven over an in-memory input. At each cursor position
/// the rule with the longest match wins, with the rule registered first
/// winning ties and `^`/`$` anchors adding one to a rule's weight each. The
/// winning rule's action receives a [Context] and may yield a token, switch
/// start conditions, or rewrite the scan with reject, more, less, unput and
/// friends. Input no rule matches is echoed to the ECHO sink one character at
/// a time, as flex does it.
pub struct Scanner<T> {
    ignore_case: bool,
    debug: bool,
    definitions: HashMap<String, String>,
    states: StateRegistry,
    rules: Vec<Rule<T>>,
    run: ScanState,
    hooks: Hooks,
}

impl<T> Default for Scanner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scanner<T> {
    /// Create a scanner without rules. The inclusive start condition
    /// `INITIAL` is registered from the outset.
    pub fn new() -> Self {
        Self {
            ignore_case: false,
            debug: false,
            definitions: HashMap::new(),
            states: StateRegistry::new(),
            rules: Vec::new(),
            run: ScanState::new(),
            hooks: Hooks::default(),
        }
    }

    /// Match patterns case-insensitively. Affects rules added afterwards.
    pub fn set_ignore_case(&mut self, ignore_case: bool) {
        self.ignore_case = ignore_case;
    }

    /// Emit one trace record per selected rule to the trace sink.
    pub fn set_debug_enabled(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Replace the ECHO sink. The default writes to standard output.
    pub fn set_echo_sink<F>(&mut self, sink: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.hooks.echo = Box::new(sink);
    }

    /// Replace the trace sink, a callable receiving the active state, the
    /// pattern source and the matched text. The default discards.
    pub fn set_trace_sink<F>(&mut self, sink: F)
    where
        F: FnMut(&str, &str, &str) + 'static,
    {
        self.hooks.trace = Box::new(sink);
    }

    /// Register a named sub-expression usable as `{name}` in the regex rules
    /// added afterwards. The body is itself expanded against previously
    /// registered definitions. Re-registering a name overwrites it; rules
    /// compiled earlier keep the old body.
    pub fn add_definition(&mut self, name: &str, fragment: &str) -> Result<()> {
        compiler::validate_name(name)?;
        if fragment.is_empty() {
            return Err(FlxError::new(FlxErrorKind::EmptyPattern));
        }
        let expanded = compiler::expand_definitions(fragment, &self.definitions);
        self.definitions.insert(name.to_string(), expanded);
        Ok(())
    }

    /// Register a start condition. Registration is idempotent.
    pub fn add_state(&mut self, name: &str, exclusive: bool) -> Result<()> {
        self.states.add(name, exclusive)
    }

    /// Add a discard rule to all currently registered inclusive states.
    pub fn add_rule(&mut self, expression: impl Into<Expression>) -> Result<()> {
        self.push_rule(StateSpec::Inclusive, expression.into(), None)
    }

    /// Add a rule with an action to all currently registered inclusive
    /// states.
    pub fn add_rule_with<F>(&mut self, expression: impl Into<Expression>, action: F) -> Result<()>
    where
        F: FnMut(&mut Context<'_>) -> Result<Option<T>> + 'static,
    {
        self.push_rule(
            StateSpec::Inclusive,
            expression.into(),
            Some(Box::new(action)),
        )
    }

    /// Add a batch of rules to all currently registered inclusive states.
    pub fn add_rules<I>(&mut self, rules: I) -> Result<()>
    where
        I: IntoIterator<Item = RuleDef<T>>,
    {
        for def in rules {
            self.push_rule(StateSpec::Inclusive, def.expression, def.action)?;
        }
        Ok(())
    }

    /// Add a discard rule to the given start conditions.
    pub fn add_state_rule(
        &mut self,
        spec: impl Into<StateSpec>,
        expression: impl Into<Expression>,
    ) -> Result<()> {
        self.push_rule(spec.into(), expression.into(), None)
    }

    /// Add a rule with an action to the given start conditions.
    pub fn add_state_rule_with<F>(
        &mut self,
        spec: impl Into<StateSpec>,
        expression: impl Into<Expression>,
        action: F,
    ) -> Result<()>
    where
        F: FnMut(&mut Context<'_>) -> Result<Option<T>> + 'static,
    {
        self.push_rule(spec.into(), expression.into(), Some(Box::new(action)))
    }

    /// Add a batch of rules to the given start conditions.
    pub fn add_state_rules<I>(&mut self, spec: impl Into<StateSpec>, rules: I) -> Result<()>
    where
        I: IntoIterator<Item = RuleDef<T>>,
    {
        let spec = spec.into();
        for def in rules {
            self.push_rule(spec.clone(), def.expression, def.action)?;
        }
        Ok(())
    }

    /// Compile and register one rule. The rule is stored once; each resolved
    /// state receives its registration index, so the tie-break stays globally
    /// well-defined across shared rules.
    fn push_rule(
        &mut self,
        spec: StateSpec,
        expression: Expression,
        action: Option<Action<T>>,
    ) -> Result<()> {
        let resolved = self.states.resolve(&spec)?;
        let pattern = match &expression {
            Expression::EndOfFile => None,
            other => Some(compiler::compile(other, &self.definitions, self.ignore_case)?),
        };
        let index = self.rules.len();
        self.rules.push(Rule::new(pattern, action));
        self.states.attach(&resolved, index);
        trace!("Registered rule {} for states {:?}", index, resolved);
        Ok(())
    }

    /// Install the input to scan and reset the runtime.
    pub fn set_source(&mut self, source: &str) {
        self.run.set_source(source);
    }

    /// Rewind the cursor to the start of the input, keeping the active start
    /// condition and the stack. Leaves the terminal state.
    pub fn restart(&mut self) {
        self.run.restart();
    }

    /// Install a new input, then rewind as [Scanner::restart] does.
    pub fn restart_with(&mut self, source: &str) {
        self.run.source = source.to_string();
        self.run.restart();
    }

    /// Reset the runtime only. The configuration stays.
    pub fn reset(&mut self) {
        self.run.reset();
    }

    /// Reset the whole scanner to its freshly constructed shape: options,
    /// definitions, states, rules, sinks and runtime.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// The current token text.
    pub fn text(&self) -> &str {
        &self.run.text
    }

    /// The name of the active start condition.
    pub fn state(&self) -> &str {
        &self.run.state
    }

    /// The cursor, a byte offset into the input.
    pub fn index(&self) -> usize {
        self.run.index
    }

    /// The input being scanned.
    pub fn source(&self) -> &str {
        &self.run.source
    }

    /// Scan until a rule action yields a token. `None` means the end of the
    /// input was reached or the scan was terminated.
    pub fn lex(&mut self) -> Result<Option<T>> {
        loop {
            match self.scan_one()? {
                Scan::Token(token) => return Ok(Some(token)),
                Scan::Nothing => continue,
                Scan::Eof => return Ok(None),
            }
        }
    }

    /// Collect tokens until the end of the input.
    pub fn lex_all(&mut self) -> Result<Vec<T>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.lex()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// An iterator over the remaining tokens of the input.
    pub fn tokens(&mut self) -> Tokens<'_, T> {
        Tokens {
            scanner: self,
            done: false,
        }
    }

    /// One driver pass: select a rule, run its action, keep the protocol
    /// around reject, more and the end of input.
    fn scan_one(&mut self) -> Result<Scan<T>> {
        if self.run.terminated {
            return Ok(Scan::Eof);
        }
        let was_eof = self.run.at_eof();
        let selected = selector::select(
            &self.rules,
            self.states.rules_of(&self.run.state),
            &self.run,
        );

        if let Some(selection) = &selected {
            if self.debug {
                let pattern = self.rules[selection.rule].pattern_source();
                (self.hooks.trace)(&self.run.state, pattern, &selection.lexeme);
            }
            self.run.last_rule = Some(selection.rule);
        }

        // Token text carry-over requested by more().
        if !self.run.read_more {
            self.run.text.clear();
        }
        self.run.read_more = false;

        let Some(selection) = selected else {
            if was_eof {
                self.run.text.clear();
                self.run.terminate();
                return Ok(Scan::Eof);
            }
            // The default rule: echo one unmatched character.
            if let Some(c) = self.run.source[self.run.index..].chars().next() {
                self.run.text.push(c);
                self.run.index += c.len_utf8();
            }
            (self.hooks.echo)(&self.run.text);
            self.run.rejected.clear();
            return Ok(Scan::Nothing);
        };

        self.run.text.push_str(&selection.lexeme);
        // Only the new match advances the cursor; text carried over by
        // more() was consumed in an earlier pass.
        self.run.index += selection.lexeme.len();

        let rejected_before = self.run.rejected.len();
        let outcome = match self.rules[selection.rule].action() {
            Some(action) => {
                let mut context = Context {
                    states: &self.states,
                    run: &mut self.run,
                    hooks: &mut self.hooks,
                };
                let mut action = action.borrow_mut();
                (*action)(&mut context)?
            }
            None => None,
        };

        if self.run.rejected.len() > rejected_before {
            // The action gave the match back; the next pass retries the
            // selection with the rejected rule left out.
            return Ok(Scan::Nothing);
        }
        self.run.rejected.clear();

        if self.run.terminated {
            return Ok(Scan::Eof);
        }
        if was_eof && self.run.at_eof() {
            // An end-of-file action that does not refill the input ends the
            // scan regardless of its return value.
            self.run.terminate();
            return Ok(Scan::Eof);
        }
        Ok(match outcome {
            Some(token) => Scan::Token(token),
            None => Scan::Nothing,
        })
    }
}

impl<T> std::fmt::Debug for Scanner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("ignore_case", &self.ignore_case)
            .field("debug", &self.debug)
            .field("rules", &self.rules.len())
            .field("state", &self.run.state)
            .finish()
    }
}

/// An iterator over the tokens of the remaining input.
///
/// Yields one `Result` per token and stops at the end of the input; after an
/// error the iterator is fused. Created with [Scanner::tokens].
pub struct Tokens<'a, T> {
    scanner: &'a mut Scanner<T>,
    done: bool,
}

impl<T> Iterator for Tokens<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.scanner.lex() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

impl<T> std::fmt::Debug for Tokens<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokens").field("done", &self.done).finish()
    }
}

//! Module with the action surface of a running scan.
//!
//! Rule actions receive a [Context] that exposes the runtime machine state
//! and the operations known from flex: echo, reject, more, less, unput,
//! input, the start condition switches and stack, terminate and restart.

use log::trace;

use crate::{
    errors::{FlxError, FlxErrorKind, Result},
    internal::runtime::{Hooks, ScanState},
    state::StateRegistry,
};

/// The surface a rule action works against.
///
/// A context borrows the scanner for the duration of one action call; the
/// driver resumes only after the action has returned.
pub struct Context<'a> {
    pub(crate) states: &'a StateRegistry,
    pub(crate) run: &'a mut ScanState,
    pub(crate) hooks: &'a mut Hooks,
}

impl Context<'_> {
    /// Write the current token text to the ECHO sink.
    pub fn echo(&mut self) {
        (self.hooks.echo)(&self.run.text);
    }

    /// Switch to the given start condition.
    pub fn begin(&mut self, state: &str) -> Result<()> {
        if !self.states.contains(state) {
            return Err(FlxError::new(FlxErrorKind::UnknownState(state.to_string())));
        }
        trace!("Begin state '{}'", state);
        self.run.state = state.to_string();
        Ok(())
    }

    /// Alias of [Context::begin].
    pub fn switch_state(&mut self, state: &str) -> Result<()> {
        self.begin(state)
    }

    /// Push the active start condition onto the stack and switch to the given
    /// one.
    pub fn push_state(&mut self, state: &str) -> Result<()> {
        if !self.states.contains(state) {
            return Err(FlxError::new(FlxErrorKind::UnknownState(state.to_string())));
        }
        let previous = std::mem::replace(&mut self.run.state, state.to_string());
        trace!("Push state '{}', begin '{}'", previous, state);
        self.run.state_stack.push(previous);
        Ok(())
    }

    /// Pop the start condition stack and switch to the popped condition.
    pub fn pop_state(&mut self) -> Result<()> {
        let state = self
            .run
            .state_stack
            .pop()
            .ok_or_else(|| FlxError::new(FlxErrorKind::StackUnderflow))?;
        trace!("Pop state, begin '{}'", state);
        self.run.state = state;
        Ok(())
    }

    /// The top of the start condition stack, if any. Does not mutate.
    pub fn top_state(&self) -> Option<&str> {
        self.run.state_stack.last().map(String::as_str)
    }

    /// Give the match back: rewind the cursor over the token text and exclude
    /// the selected rule at this position. The driver retries the selection
    /// with the rejected rule left out.
    pub fn reject(&mut self) {
        self.run.index = self.run.index.saturating_sub(self.run.text.len());
        if let Some(index) = self.run.last_rule {
            if !self.run.rejected.contains(&index) {
                trace!("Reject rule {}", index);
                self.run.rejected.push(index);
            }
        }
    }

    /// Append the next match to the current token text instead of replacing
    /// it.
    pub fn more(&mut self) {
        self.run.read_more = true;
    }

    /// Keep the first `n` characters of the token text and give the rest back
    /// to the input. A `n` of at least the text length leaves everything as
    /// it is.
    pub fn less(&mut self, n: usize) {
        if let Some((keep, _)) = self.run.text.char_indices().nth(n) {
            self.run.index = self.run.index.saturating_sub(self.run.text.len() - keep);
            self.run.text.truncate(keep);
        }
    }

    /// Splice `text` into the input at the cursor so it is read next.
    pub fn unput(&mut self, text: &str) {
        self.run.source.insert_str(self.run.index, text);
    }

    /// Read up to `n` characters from the cursor and advance over them.
    /// Near the end of the input fewer characters, or none, are returned.
    pub fn input(&mut self, n: usize) -> String {
        if self.run.index >= self.run.source.len() {
            return String::new();
        }
        let taken: String = self.run.source[self.run.index..].chars().take(n).collect();
        self.run.index += taken.len();
        taken
    }

    /// Reset the runtime and enter the terminal state. The driver reports end
    /// of input to the caller of [crate::Scanner::lex] until the scanner is
    /// restarted or given a fresh source.
    pub fn terminate(&mut self) {
        trace!("Terminate");
        self.run.terminate();
    }

    /// Rewind the cursor to the start of the input. The active start
    /// condition and the stack are left as they are.
    pub fn restart(&mut self) {
        self.run.restart();
    }

    /// Install a new input, then rewind as [Context::restart] does.
    pub fn restart_with(&mut self, source: &str) {
        self.run.source = source.to_string();
        self.run.restart();
    }

    /// The current token text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.run.text
    }

    /// Replace the current token text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.run.text = text.into();
    }

    /// The name of the active start condition.
    #[inline]
    pub fn state(&self) -> &str {
        &self.run.state
    }

    /// The cursor, a byte offset into the input.
    #[inline]
    pub fn index(&self) -> usize {
        self.run.index
    }

    /// The input being scanned.
    #[inline]
    pub fn source(&self) -> &str {
        &self.run.source
    }
}

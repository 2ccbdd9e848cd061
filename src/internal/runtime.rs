//! Module with the mutable machine state of a running scan and the output
//! hooks the scanner reports through.

use crate::STATE_INITIAL;

/// The runtime state of the scanner.
///
/// All offsets are byte offsets into `source` and always lie on a char
/// boundary. The invariant `index <= source.len()` holds between driver
/// passes and across every action call.
#[derive(Debug, Clone)]
pub(crate) struct ScanState {
    /// The current input. `unput` and `restart` can amend or replace it.
    pub(crate) source: String,
    /// The cursor. The next match starts exactly here.
    pub(crate) index: usize,
    /// The current token text. Actions may replace it.
    pub(crate) text: String,
    /// The name of the active start condition.
    pub(crate) state: String,
    /// The start condition stack driven by push_state/pop_state.
    pub(crate) state_stack: Vec<String>,
    /// When set, the next match is appended to `text` instead of replacing it.
    pub(crate) read_more: bool,
    /// Registration indices already chosen and rejected at the current cursor
    /// position. Cleared as soon as the cursor advances without a new reject.
    pub(crate) rejected: Vec<usize>,
    /// The rule picked by the most recent selection.
    pub(crate) last_rule: Option<usize>,
    /// The terminal state. Left only via restart or a fresh source.
    pub(crate) terminated: bool,
}

impl ScanState {
    pub(crate) fn new() -> Self {
        Self {
            source: String::new(),
            index: 0,
            text: String::new(),
            state: STATE_INITIAL.to_string(),
            state_stack: Vec::new(),
            read_more: false,
            rejected: Vec::new(),
            last_rule: None,
            terminated: false,
        }
    }

    /// True when the cursor has reached or passed the end of the input.
    #[inline]
    pub(crate) fn at_eof(&self) -> bool {
        self.index >= self.source.len()
    }

    /// Reset all runtime fields, keeping the input.
    pub(crate) fn reset(&mut self) {
        self.index = 0;
        self.text.clear();
        self.state = STATE_INITIAL.to_string();
        self.state_stack.clear();
        self.read_more = false;
        self.rejected.clear();
        self.last_rule = None;
        self.terminated = false;
    }

    /// Install a new input and reset the runtime.
    pub(crate) fn set_source(&mut self, source: &str) {
        self.source = source.to_string();
        self.reset();
    }

    /// Enter the terminal state.
    pub(crate) fn terminate(&mut self) {
        self.reset();
        self.terminated = true;
    }

    /// Rewind the cursor to the start of the input. The active start
    /// condition and the stack are left as they are.
    pub(crate) fn restart(&mut self) {
        self.index = 0;
        self.text.clear();
        self.read_more = false;
        self.rejected.clear();
        self.last_rule = None;
        self.terminated = false;
    }
}

/// The ECHO sink. Receives the current token text.
pub(crate) type EchoSink = Box<dyn FnMut(&str)>;

/// The trace sink. Receives the active state, the pattern source and the
/// matched text of a selected rule.
pub(crate) type TraceSink = Box<dyn FnMut(&str, &str, &str)>;

/// The output collaborators of the scanner.
pub(crate) struct Hooks {
    pub(crate) echo: EchoSink,
    pub(crate) trace: TraceSink,
}

impl Default for Hooks {
    /// The default ECHO sink writes to standard output, the default trace
    /// sink discards.
    fn default() -> Self {
        Hooks {
            echo: Box::new(|text| {
                use std::io::Write;
                let _ = std::io::stdout().write_all(text.as_bytes());
            }),
            trace: Box::new(|_, _, _| {}),
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hooks")
    }
}

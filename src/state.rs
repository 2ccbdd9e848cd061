//! Module with the start condition registry and the state specifier type.

use std::collections::HashMap;

use crate::{
    errors::{FlxError, FlxErrorKind, Result},
    internal::compiler::validate_name,
};

/// The name of the start condition every scanner owns from construction.
pub const STATE_INITIAL: &str = "INITIAL";

/// The pseudo state that expands to all registered start conditions.
pub const STATE_ANY: &str = "*";

/// The set of start conditions a rule is registered for.
///
/// A specifier resolves against the start conditions registered at the time
/// the rule is added; states registered later are not back-filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateSpec {
    /// All inclusive start conditions registered so far. This is what a rule
    /// without an explicit state specifier gets.
    Inclusive,
    /// All start conditions registered so far, exclusive ones included.
    Any,
    /// An explicit list of start condition names.
    Named(Vec<String>),
}

impl From<&str> for StateSpec {
    /// The string [STATE_ANY] converts to [StateSpec::Any]; every other
    /// string names a single start condition.
    fn from(name: &str) -> Self {
        if name == STATE_ANY {
            StateSpec::Any
        } else {
            StateSpec::Named(vec![name.to_string()])
        }
    }
}

impl From<String> for StateSpec {
    fn from(name: String) -> Self {
        StateSpec::from(name.as_str())
    }
}

impl From<Vec<String>> for StateSpec {
    fn from(names: Vec<String>) -> Self {
        StateSpec::Named(names)
    }
}

impl From<&[&str]> for StateSpec {
    fn from(names: &[&str]) -> Self {
        StateSpec::Named(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for StateSpec {
    fn from(names: [&str; N]) -> Self {
        StateSpec::Named(names.iter().map(|n| n.to_string()).collect())
    }
}

/// A registered start condition with its ordered rule list.
#[derive(Debug, Clone, Default)]
pub(crate) struct StateEntry {
    /// Exclusive start conditions gate out rules registered without an
    /// explicit state specifier.
    pub(crate) exclusive: bool,
    /// Registration indices of the rules active in this state, in
    /// registration order.
    pub(crate) rules: Vec<usize>,
}

/// The registry of start conditions.
#[derive(Debug, Clone)]
pub(crate) struct StateRegistry {
    states: HashMap<String, StateEntry>,
}

impl StateRegistry {
    /// Create a registry holding the implicit inclusive `INITIAL` state.
    pub(crate) fn new() -> Self {
        let mut states = HashMap::new();
        states.insert(STATE_INITIAL.to_string(), StateEntry::default());
        Self { states }
    }

    /// Register a start condition. Re-registration is idempotent and only
    /// updates the exclusive flag; rules already attached stay attached.
    pub(crate) fn add(&mut self, name: &str, exclusive: bool) -> Result<()> {
        validate_name(name)?;
        self.states.entry(name.to_string()).or_default().exclusive = exclusive;
        Ok(())
    }

    /// Check if a start condition is registered.
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// The ordered rule list of a start condition; empty for unknown names.
    pub(crate) fn rules_of(&self, name: &str) -> &[usize] {
        self.states
            .get(name)
            .map(|entry| entry.rules.as_slice())
            .unwrap_or(&[])
    }

    /// Append a rule's registration index to each of the given states.
    pub(crate) fn attach(&mut self, state_names: &[String], index: usize) {
        for name in state_names {
            if let Some(entry) = self.states.get_mut(name) {
                entry.rules.push(index);
            }
        }
    }

    /// Resolve a state specifier against the currently registered start
    /// conditions.
    pub(crate) fn resolve(&self, spec: &StateSpec) -> Result<Vec<String>> {
        let resolved: Vec<String> = match spec {
            StateSpec::Inclusive => self
                .states
                .iter()
                .filter(|(_, entry)| !entry.exclusive)
                .map(|(name, _)| name.clone())
                .collect(),
            StateSpec::Any => self.states.keys().cloned().collect(),
            StateSpec::Named(names) => {
                for name in names {
                    if !self.states.contains_key(name) {
                        return Err(FlxError::new(FlxErrorKind::UnknownState(name.clone())));
                    }
                }
                names.clone()
            }
        };
        if resolved.is_empty() {
            return Err(FlxError::new(FlxErrorKind::EmptyStateSet));
        }
        Ok(resolved)
    }
}

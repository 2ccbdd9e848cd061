//! Module with the rule selection algorithm.

use log::trace;

use crate::{internal::runtime::ScanState, rule::Rule};

/// The outcome of a selection pass: the registration index of the chosen rule
/// and the raw matched substring. End-of-file rules match the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selection {
    pub(crate) rule: usize,
    pub(crate) lexeme: String,
}

/// Select the best rule for the current cursor position.
///
/// Rules are tried in registration order. The winner is the rule with the
/// greatest effective length, i.e. the raw match length plus one per `^`/`$`
/// anchor; on equal effective length the earliest registered rule wins. At
/// the end of the input the first end-of-file rule wins instead. Rules in the
/// rejected set never participate.
///
/// A zero-length match is a legal winner. It is the caller's business to keep
/// the scan from looping on one.
pub(crate) fn select<T>(rules: &[Rule<T>], order: &[usize], run: &ScanState) -> Option<Selection> {
    let at_eof = run.at_eof();
    let mut best: Option<usize> = None;
    let mut best_effective = 0usize;
    let mut best_raw = 0usize;

    for &index in order {
        if run.rejected.contains(&index) {
            continue;
        }
        let rule = &rules[index];
        let Some(pattern) = rule.pattern() else {
            if at_eof {
                return Some(Selection {
                    rule: index,
                    lexeme: String::new(),
                });
            }
            continue;
        };
        if at_eof {
            continue;
        }
        // A literal cannot improve on a match at least as long.
        if let Some(width) = pattern.fixed_width() {
            if best.is_some() && width <= best_raw {
                continue;
            }
        }
        let Some(raw) = pattern.match_len_at(&run.source, run.index) else {
            continue;
        };
        let effective = raw + usize::from(pattern.has_bol()) + usize::from(pattern.has_eol());
        if best.is_none() || effective > best_effective {
            best = Some(index);
            best_effective = effective;
            best_raw = raw;
        }
    }

    best.map(|index| {
        let lexeme = run.source[run.index..run.index + best_raw].to_string();
        trace!(
            "Selected rule {} with '{}' at {}",
            index,
            lexeme.escape_default(),
            run.index
        );
        Selection { rule: index, lexeme }
    })
}

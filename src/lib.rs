#![forbid(missing_docs)]
//! # `flx`
//! The `flx` crate is a runtime-configurable lexical scanner in the manner of
//! the classic flex tool. Instead of generating a scanner from a grammar file
//! at build time, a caller assembles one at runtime: named sub-expressions
//! (definitions), start conditions (states) and rules made of a pattern and
//! an action. The scanner then drives a scanning loop over an in-memory
//! input, selecting the best-matching rule at each position, invoking the
//! rule's action and yielding whatever tokens the actions produce.
//!
//! Rule selection follows flex: the longest match wins, ties go to the rule
//! registered first, and a satisfied `^` or `$` anchor adds one to a rule's
//! weight so anchored rules beat tied unanchored ones. Actions have the full
//! flex toolbox available through [Context]: `echo`, `reject`, `more`,
//! `less`, `unput`, `input`, the start condition stack, `terminate` and
//! `restart`. Input that no rule matches is echoed to the ECHO sink one
//! character at a time instead of raising an error.
//!
//! # Example with definitions
//! ```rust
//! use flx::{Expression, FlxError, Scanner};
//!
//! let mut scanner = Scanner::new();
//! scanner.add_definition("DIGIT", "[0-9]").unwrap();
//! scanner
//!     .add_rule_with(Expression::regex(r"{DIGIT}+\.{DIGIT}+"), |ctx| {
//!         ctx.text().parse::<f64>().map(Some).map_err(FlxError::user)
//!     })
//!     .unwrap();
//! scanner.add_rule(Expression::regex(r"\s+")).unwrap();
//! scanner.set_source("1.2 3.4 5.6");
//! assert_eq!(scanner.lex_all().unwrap(), vec![1.2, 3.4, 5.6]);
//! ```
//!
//! # Example with start conditions
//! A parser can use different start conditions for different parts of the
//! input, e.g. to scan string content in one condition and code in another.
//! ```rust
//! use flx::{Expression, Scanner, STATE_INITIAL};
//!
//! let mut scanner = Scanner::new();
//! scanner.add_state("STRING", true).unwrap();
//! scanner
//!     .add_rule_with("\"", |ctx| {
//!         ctx.begin("STRING")?;
//!         Ok(None)
//!     })
//!     .unwrap();
//! scanner
//!     .add_state_rule_with("STRING", "\"", |ctx| {
//!         ctx.begin(STATE_INITIAL)?;
//!         Ok(None)
//!     })
//!     .unwrap();
//! scanner
//!     .add_state_rule_with("STRING", Expression::regex(r#"[^"]+"#), |ctx| {
//!         Ok(Some(format!("string: {}", ctx.text())))
//!     })
//!     .unwrap();
//! scanner
//!     .add_rule_with(Expression::regex(r"[a-zA-Z_]\w*"), |ctx| {
//!         Ok(Some(format!("id: {}", ctx.text())))
//!     })
//!     .unwrap();
//! scanner.add_rule(Expression::regex(r"\s+")).unwrap();
//! scanner.set_source(r#"Id1 "1. String" "2. String""#);
//! assert_eq!(
//!     scanner.lex_all().unwrap(),
//!     vec![
//!         "id: Id1".to_string(),
//!         "string: 1. String".to_string(),
//!         "string: 2. String".to_string(),
//!     ]
//! );
//! ```

/// Module with the action surface handed to rule actions.
mod context;
pub use context::Context;

/// Module with error definitions.
mod errors;
pub use errors::{FlxError, FlxErrorKind, Result};

/// Module that provides the Expression type.
mod expression;
pub use expression::{Expression, RULE_EOF};

/// The module with internal implementation details.
mod internal;

/// Module that provides the rule definition types.
mod rule;
pub use rule::{Action, RuleDef};

/// The module with the scanner.
mod scanner;
pub use scanner::{Scanner, Tokens};

/// Module with the start condition types.
mod state;
pub use state::{StateSpec, STATE_ANY, STATE_INITIAL};

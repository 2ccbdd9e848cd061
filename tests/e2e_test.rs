// End-to-end scenarios exercising the whole scan loop.
// Run with `cargo test --test e2e_test`

use std::{cell::RefCell, rc::Rc};

use flx::{Expression, FlxError, Scanner, STATE_INITIAL};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Capture the scanner's ECHO output in a shared buffer.
fn echo_buffer<T>(scanner: &mut Scanner<T>) -> Rc<RefCell<String>> {
    let buffer = Rc::new(RefCell::new(String::new()));
    let sink = buffer.clone();
    scanner.set_echo_sink(move |text| sink.borrow_mut().push_str(text));
    buffer
}

#[test]
fn floats() {
    init();
    let mut scanner = Scanner::new();
    scanner.add_definition("DIGIT", "[0-9]").unwrap();
    scanner
        .add_rule_with(Expression::regex(r"{DIGIT}+\.{DIGIT}+"), |_| {
            Ok(Some("float"))
        })
        .unwrap();
    scanner.add_rule(Expression::regex(r"\s+")).unwrap();
    scanner.set_source("1.2 3.4 5.6");
    assert_eq!(scanner.lex_all().unwrap(), vec!["float", "float", "float"]);
}

#[test]
fn zap_me() {
    init();
    let mut scanner: Scanner<()> = Scanner::new();
    let echoed = echo_buffer(&mut scanner);
    scanner.add_rule("zap me").unwrap();
    scanner.set_source("bla zap me bla zap me bla");
    assert!(scanner.lex_all().unwrap().is_empty());
    assert_eq!(echoed.borrow().as_str(), "bla  bla  bla");
}

#[test]
fn reject_word_count() {
    init();
    let mut scanner: Scanner<()> = Scanner::new();
    let _echoed = echo_buffer(&mut scanner);
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    scanner
        .add_rule_with("frob", |ctx| {
            ctx.reject();
            Ok(None)
        })
        .unwrap();
    scanner
        .add_rule_with(Expression::regex(r"[^\s]+"), move |_| {
            *counter.borrow_mut() += 1;
            Ok(None)
        })
        .unwrap();
    scanner.set_source("frob frob frob");
    scanner.lex_all().unwrap();
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn nested_reject_echo() {
    init();
    let mut scanner: Scanner<()> = Scanner::new();
    let echoed = echo_buffer(&mut scanner);
    for literal in ["a", "ab", "abc", "abcd"] {
        scanner
            .add_rule_with(literal, |ctx| {
                ctx.echo();
                ctx.reject();
                Ok(None)
            })
            .unwrap();
    }
    scanner.add_rule(Expression::regex(".")).unwrap();
    scanner.set_source("abcd");
    scanner.lex_all().unwrap();
    assert_eq!(echoed.borrow().as_str(), "abcdabcaba");
}

#[test]
fn more_carries_text_over() {
    init();
    let mut scanner: Scanner<()> = Scanner::new();
    let echoed = echo_buffer(&mut scanner);
    scanner
        .add_rule_with("mega-", |ctx| {
            ctx.echo();
            ctx.more();
            Ok(None)
        })
        .unwrap();
    scanner
        .add_rule_with("kludge", |ctx| {
            ctx.echo();
            Ok(None)
        })
        .unwrap();
    scanner.set_source("mega-kludge!");
    scanner.lex_all().unwrap();
    // The carried-over text does not advance the cursor a second time; the
    // trailing `!` is still scanned and falls through to the default rule.
    assert_eq!(echoed.borrow().as_str(), "mega-mega-kludge!");
}

#[test]
fn less_gives_back_the_tail() {
    init();
    let mut scanner: Scanner<()> = Scanner::new();
    let echoed = echo_buffer(&mut scanner);
    scanner
        .add_rule_with("foobar", |ctx| {
            ctx.echo();
            ctx.less(3);
            Ok(None)
        })
        .unwrap();
    scanner
        .add_rule_with(Expression::regex("[a-z]+"), |ctx| {
            ctx.echo();
            Ok(None)
        })
        .unwrap();
    scanner.set_source("foobar");
    scanner.lex_all().unwrap();
    assert_eq!(echoed.borrow().as_str(), "foobarbar");
}

#[test]
fn exclusive_comment_state() {
    init();
    let mut scanner: Scanner<()> = Scanner::new();
    let echoed = echo_buffer(&mut scanner);
    scanner.add_state("COMMENT", true).unwrap();
    scanner
        .add_rule_with("/*", |ctx| {
            ctx.begin("COMMENT")?;
            Ok(None)
        })
        .unwrap();
    scanner
        .add_state_rule_with("COMMENT", Expression::regex(r"\*+/"), |ctx| {
            ctx.begin(STATE_INITIAL)?;
            Ok(None)
        })
        .unwrap();
    scanner
        .add_state_rule("COMMENT", Expression::regex("(?s)."))
        .unwrap();
    scanner.set_source("test /* a */ test");
    scanner.lex_all().unwrap();
    assert_eq!(echoed.borrow().as_str(), "test  test");
}

#[derive(Debug, PartialEq)]
enum Tok {
    Int(u64),
    Float(f64),
    Dot,
}

#[test]
fn inclusive_expect_state() {
    init();
    let mut scanner = Scanner::new();
    let _echoed = echo_buffer(&mut scanner);
    scanner.add_state("expect", false).unwrap();
    scanner
        .add_rule_with("expect floats", |ctx| {
            ctx.begin("expect")?;
            Ok(None)
        })
        .unwrap();
    scanner
        .add_state_rule_with("expect", Expression::regex(r"\d+\.\d+"), |ctx| {
            ctx.text()
                .parse()
                .map(|f| Some(Tok::Float(f)))
                .map_err(FlxError::user)
        })
        .unwrap();
    scanner
        .add_state_rule_with("expect", Expression::regex(r"\n"), |ctx| {
            ctx.begin(STATE_INITIAL)?;
            Ok(None)
        })
        .unwrap();
    scanner
        .add_rule_with(Expression::regex(r"\d+"), |ctx| {
            ctx.text()
                .parse()
                .map(|i| Some(Tok::Int(i)))
                .map_err(FlxError::user)
        })
        .unwrap();
    scanner.add_rule_with(".", |_| Ok(Some(Tok::Dot))).unwrap();
    scanner.add_rule(" ").unwrap();
    scanner.set_source("1.1\nexpect floats 2.2\n3.3\n");
    assert_eq!(
        scanner.lex_all().unwrap(),
        vec![
            Tok::Int(1),
            Tok::Dot,
            Tok::Int(1),
            Tok::Float(2.2),
            Tok::Int(3),
            Tok::Dot,
            Tok::Int(3),
        ]
    );
}

#[test]
fn input_reads_ahead_of_the_match() {
    init();
    let mut scanner = Scanner::new();
    let echoed = echo_buffer(&mut scanner);
    scanner
        .add_rule_with("take", |ctx| Ok(Some(ctx.input(3))))
        .unwrap();
    scanner.set_source("takeabcde");
    assert_eq!(scanner.lex().unwrap(), Some("abc".to_string()));
    // The characters read by input() are consumed; only the rest is echoed.
    assert_eq!(scanner.lex().unwrap(), None);
    assert_eq!(echoed.borrow().as_str(), "de");
}

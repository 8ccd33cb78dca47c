// tests/parser_tests.rs

use std::collections::HashSet;

use prototest::assertion::{Check, Column};
use prototest::comparator::{NumericOp, TextOp};
use prototest::parser::{ConfigParser, ParsedConfig};
use prototest::ConfigDiagnostic;

fn parse(source: &str) -> ParsedConfig {
    ConfigParser::new("sample.test", source, 12345).parse()
}

// ---
// Test cases and invocations
// ---

#[test]
fn test_assertions_attach_to_latest_case() {
    let parsed = parse(
        "// leading comment\n\
         test: $(PROTO) a.proto -D\n\
         = 2 0 5.0\n\
         \n\
         test: $(PROTO) b.proto\n\
         > 0 1 3\n\
         is 1 _ done\n",
    );
    assert!(parsed.diagnostics.is_empty());
    assert_eq!(parsed.cases.len(), 2);
    assert_eq!(parsed.cases[0].assertions().len(), 1);
    assert_eq!(parsed.cases[1].assertions().len(), 2);
}

#[test]
fn test_stem_is_inserted_after_existing_dump_flag() {
    let parsed = parse("test: $(PROTO) a.proto -D -n 10\n= 0 0 1\n");
    assert_eq!(
        parsed.cases[0].invocation(),
        "$(PROTO) a.proto -D -dump-stem prototest12345_0_ -n 10"
    );
    assert_eq!(parsed.cases[0].dump_prefix(), "prototest12345_0_");
}

#[test]
fn test_dump_flags_are_appended_when_missing() {
    let parsed = parse("test: $(PROTO) a.proto -n 10\n= 0 0 1\n");
    assert_eq!(
        parsed.cases[0].invocation(),
        "$(PROTO) a.proto -n 10 -D -dump-stem prototest12345_0_"
    );
}

#[test]
fn test_quiet_mode_adds_headless_unless_exempt() {
    let source = "test: $(PROTO) a\n= 0 0 1\n\
                  test: $(PROTO) b -headless\n= 0 0 1\n\
                  test: $(PROTO) c --test-compiler\n= 0 0 1\n";
    let parsed = ConfigParser::new("q.test", source, 1).quiet(true).parse();
    let headless: Vec<usize> = parsed
        .cases
        .iter()
        .map(|c| c.invocation().matches("-headless").count())
        .collect();
    assert_eq!(headless, vec![1, 1, 0]);

    let loud = ConfigParser::new("q.test", source, 1).parse();
    assert!(!loud.cases[0].invocation().contains("-headless"));
}

#[test]
fn test_stems_are_pairwise_distinct() {
    let mut source = String::new();
    for i in 0..40 {
        source.push_str(&format!("test: $(PROTO) case{i}.proto\n= 0 0 {i}\n"));
    }
    let parsed = parse(&source);
    let prefixes: HashSet<&str> = parsed.cases.iter().map(|c| c.dump_prefix()).collect();
    assert_eq!(prefixes.len(), 40);
}

#[test]
fn test_cases_without_assertions_are_dropped() {
    let parsed = parse("test: a\ntest: b\n= 0 0 1\ntest: c\n");
    assert_eq!(parsed.cases.len(), 1);
    assert!(parsed.cases[0].invocation().starts_with("b "));
    // The counter still advanced past the dropped case.
    assert_eq!(parsed.cases[0].dump_prefix(), "prototest12345_1_");
}

// ---
// Assertion directives
// ---

#[test]
fn test_numeric_directive_fields() {
    let parsed = parse("test: x\n= 2 0 5.0\n");
    let assertion = &parsed.cases[0].assertions()[0];
    assert_eq!(assertion.line(), 2);
    assert_eq!(assertion.column(), Column::Index(0));
    match assertion.check() {
        Check::Numeric { comparator, expected } => {
            assert_eq!(comparator.op(), NumericOp::Equal);
            assert_eq!(*expected, 5.0);
        }
        other => panic!("expected a numeric check, got {other:?}"),
    }
}

#[test]
fn test_tolerance_is_curried() {
    let parsed = parse("test: x\n~= 0 1 10.0 0.5\n");
    match parsed.cases[0].assertions()[0].check() {
        Check::Numeric { comparator, .. } => {
            assert_eq!(comparator.op(), NumericOp::Near);
            assert_eq!(comparator.params(), &[0.5]);
        }
        other => panic!("expected a numeric check, got {other:?}"),
    }
}

#[test]
fn test_whole_line_text_keeps_inner_whitespace() {
    let parsed = parse("test: x\nhas 1 _   \"error\"   in   here  \n");
    match parsed.cases[0].assertions()[0].check() {
        Check::Text { op, expected } => {
            assert_eq!(*op, TextOp::Has);
            assert_eq!(expected, "\"error\"   in   here");
        }
        other => panic!("expected a text check, got {other:?}"),
    }
}

#[test]
fn test_is_nan_needs_no_expected_value() {
    let parsed = parse("test: x\nis_nan 0 3\n");
    assert!(parsed.diagnostics.is_empty());
    assert_eq!(parsed.cases[0].assertions().len(), 1);
}

// ---
// Diagnostics
// ---

#[test]
fn test_unrecognized_directive_is_reported_and_skipped() {
    let parsed = parse("test: x\nxyz 1 2 3\n= 0 0 1\n");
    assert_eq!(parsed.cases[0].assertions().len(), 1);
    assert_eq!(parsed.diagnostics.len(), 1);
    match &parsed.diagnostics[0] {
        ConfigDiagnostic::UnrecognizedDirective { command, line_number, .. } => {
            assert_eq!(command, "xyz");
            assert_eq!(*line_number, 2);
        }
        other => panic!("unexpected diagnostic {other:?}"),
    }
}

#[test]
fn test_malformed_assertions_do_not_stop_the_parse() {
    let parsed = parse(
        "test: x\n\
         = 0\n\
         = a 0 1\n\
         = 0 _ 1\n\
         = 0 0 five\n\
         = 0 0 1 2\n\
         ~= 0 0 1\n\
         ~= 0 0 1 -0.5\n\
         is 0 1 two words\n\
         has 0 _\n\
         < 0 0 1\n",
    );
    assert_eq!(parsed.cases.len(), 1);
    assert_eq!(parsed.cases[0].assertions().len(), 1);
    assert_eq!(parsed.diagnostics.len(), 9);
    assert!(parsed
        .diagnostics
        .iter()
        .all(|d| matches!(d, ConfigDiagnostic::MalformedAssertion { .. })));
    let lines: Vec<usize> = parsed.diagnostics.iter().map(|d| d.line_number()).collect();
    assert_eq!(lines, (2..=10).collect::<Vec<_>>());
}

#[test]
fn test_assertion_before_any_case_is_an_orphan() {
    let parsed = parse("= 0 0 1\ntest: x\n= 0 0 1\n");
    assert_eq!(parsed.cases.len(), 1);
    assert!(matches!(
        parsed.diagnostics.as_slice(),
        [ConfigDiagnostic::OrphanAssertion { line_number: 1, .. }]
    ));
}

#[test]
fn test_crlf_line_endings_are_accepted() {
    let parsed = parse("test: x\r\nis 0 _ hello world\r\n");
    match parsed.cases[0].assertions()[0].check() {
        Check::Text { expected, .. } => assert_eq!(expected, "hello world"),
        other => panic!("expected a text check, got {other:?}"),
    }
}

#[test]
fn test_every_diagnostic_is_a_warning() {
    let parsed = parse("= 0 0 1\ntest: x\nxyz 1\n= a 0 1\n= 0 0 1\n");
    assert_eq!(parsed.diagnostics.len(), 3);
    assert!(parsed.diagnostics.iter().all(ConfigDiagnostic::is_warning));
}

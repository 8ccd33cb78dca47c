//! # Config Parser
//!
//! Turns a config file into test cases. The format is line oriented and
//! whitespace tokenized:
//!
//! ```text
//! // comment
//! test: $(PROTO) "(green (sense 1))" -n 10 -D -stop-after 5
//! =   0 3 1
//! ~=  1 2 0.5 0.01
//! has 2 _ green light
//! ```
//!
//! - `test:` opens a new case; the rest of the line is the target's argument list.
//! - A comparator symbol adds an assertion to the open case:
//!   `<symbol> <line> <column> <expected> [extra...]`.
//! - Anything else is reported and skipped. A bad line never stops the parse.
//!
//! Cases that end up with no assertions are dropped.

use std::sync::Arc;

use miette::{NamedSource, SourceSpan};

use crate::assertion::{Assertion, Column};
use crate::case::TestCase;
use crate::comparator::{Comparator, NumericOp, TextOp};
use crate::dump::dump_stem;
use crate::errors::diagnostic::{ConfigDiagnostic, ConfigSource};

pub const TEST_COMMAND: &str = "test:";
pub const COMMENT_MARKER: &str = "//";

const DUMP_FLAG: &str = "-D";
const DUMP_STEM_FLAG: &str = "-dump-stem";
const HEADLESS_FLAG: &str = "-headless";
const COMPILER_ONLY_FLAG: &str = "--test-compiler";

/// Output of one parse: the surviving cases and everything that was skipped.
#[derive(Debug, Default)]
pub struct ParsedConfig {
    pub cases: Vec<TestCase>,
    pub diagnostics: Vec<ConfigDiagnostic>,
}

#[derive(Debug, Clone)]
pub struct ConfigParser<'a> {
    name: String,
    source: &'a str,
    seed: u32,
    quiet: bool,
}

/// Why an assertion line was rejected.
struct Malformed {
    reason: String,
    help: Option<String>,
}

impl Malformed {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            help: None,
        }
    }

    fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Mutable state of a single pass.
struct ParseState {
    src: ConfigSource,
    cases: Vec<TestCase>,
    diagnostics: Vec<ConfigDiagnostic>,
    next_index: usize,
}

impl<'a> ConfigParser<'a> {
    /// `seed` salts the dump stems of every case in this file.
    pub fn new(name: impl Into<String>, source: &'a str, seed: u32) -> Self {
        Self {
            name: name.into(),
            source,
            seed,
            quiet: false,
        }
    }

    /// In quiet mode every test is made headless unless it already is or
    /// only exercises the compiler.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn parse(&self) -> ParsedConfig {
        let mut state = ParseState {
            src: Arc::new(NamedSource::new(self.name.clone(), self.source.to_string())),
            cases: Vec::new(),
            diagnostics: Vec::new(),
            next_index: 0,
        };

        let mut offset = 0;
        for (index, raw) in self.source.split_inclusive('\n').enumerate() {
            let start = offset;
            offset += raw.len();
            let line = raw.trim_end_matches(['\n', '\r']);
            self.parse_line(&mut state, line, index + 1, line_span(line, start));
        }

        let total = state.cases.len();
        state.cases.retain(|case| !case.assertions().is_empty());
        tracing::debug!(
            file = %self.name,
            cases = state.cases.len(),
            dropped = total - state.cases.len(),
            "parsed config"
        );

        ParsedConfig {
            cases: state.cases,
            diagnostics: state.diagnostics,
        }
    }

    fn parse_line(&self, state: &mut ParseState, line: &str, line_number: usize, span: SourceSpan) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = tokens.first() else {
            return;
        };

        if command == TEST_COMMAND {
            tracing::trace!(line_number, "PARSER: encountered a test: {line}");
            let case = self.start_case(&tokens[1..], state.next_index);
            state.next_index += 1;
            state.cases.push(case);
            return;
        }

        if command.starts_with(COMMENT_MARKER) {
            tracing::trace!(line_number, "PARSER: encountered a comment: {line}");
            return;
        }

        let Some(comparator) = Comparator::lookup(command) else {
            tracing::trace!(line_number, "PARSER: encountered unrecognized command: {line}");
            state.diagnostics.push(ConfigDiagnostic::UnrecognizedDirective {
                command: command.to_string(),
                line_number,
                src: state.src.clone(),
                span,
            });
            return;
        };

        tracing::trace!(line_number, "PARSER: encountered a {} assertion: {line}", kind_name(comparator));
        let Some(case) = state.cases.last_mut() else {
            state.diagnostics.push(ConfigDiagnostic::OrphanAssertion {
                line_number,
                src: state.src.clone(),
                span,
            });
            return;
        };

        match parse_assertion(comparator, line, &tokens) {
            Ok(assertion) => case.add(assertion),
            Err(malformed) => state.diagnostics.push(ConfigDiagnostic::MalformedAssertion {
                reason: malformed.reason,
                line_number,
                src: state.src.clone(),
                span,
                help: malformed.help,
            }),
        }
    }

    /// Builds the case for a `test:` line, wiring in its unique dump stem.
    fn start_case(&self, args: &[&str], index: usize) -> TestCase {
        let stem = dump_stem(self.seed, index);
        let mut args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();

        match args.iter().position(|arg| arg == DUMP_FLAG) {
            Some(at) => {
                args.insert(at + 1, DUMP_STEM_FLAG.to_string());
                args.insert(at + 2, stem.clone());
            }
            None => args.extend([DUMP_FLAG.to_string(), DUMP_STEM_FLAG.to_string(), stem.clone()]),
        }

        let exempt = args.iter().any(|arg| arg == HEADLESS_FLAG || arg == COMPILER_ONLY_FLAG);
        if self.quiet && !exempt {
            args.push(HEADLESS_FLAG.to_string());
        }

        TestCase::new(args.join(" "), stem)
    }
}

// ============================================================================
// ASSERTION DIRECTIVES
// ============================================================================

fn parse_assertion(comparator: Comparator, line: &str, tokens: &[&str]) -> Result<Assertion, Malformed> {
    let usage = usage(comparator);
    let missing = |what: &str| Malformed::new(format!("missing {what}")).with_help(format!("usage: {usage}"));

    let line_token = tokens.get(1).ok_or_else(|| missing("line number"))?;
    let dump_line: usize = line_token
        .parse()
        .map_err(|_| Malformed::new(format!("line number '{line_token}' is not a non-negative integer")))?;

    let column_token = tokens.get(2).ok_or_else(|| missing("column"))?;
    let column = Column::parse(column_token).ok_or_else(|| {
        Malformed::new(format!("column '{column_token}' is not a non-negative integer or '_'"))
    })?;

    match comparator {
        Comparator::Numeric(op) => parse_numeric(op, dump_line, column, tokens, &missing),
        Comparator::Text(op) => parse_text(op, dump_line, column, line, tokens, &missing),
    }
}

fn parse_numeric(
    op: NumericOp,
    dump_line: usize,
    column: Column,
    tokens: &[&str],
    missing: &dyn Fn(&str) -> Malformed,
) -> Result<Assertion, Malformed> {
    if column == Column::WholeLine {
        return Err(Malformed::new("numeric comparators need a column number")
            .with_help("use 'is' or 'has' to compare whole lines"));
    }
    let expected_token = tokens.get(3).ok_or_else(|| missing("expected value"))?;
    let expected: f64 = expected_token
        .parse()
        .map_err(|_| Malformed::new(format!("expected value '{expected_token}' is not a number")))?;
    let comparator = op
        .bind(&tokens[4..])
        .map_err(|e| Malformed::new(e.to_string()).with_help(format!("usage: {}", usage(Comparator::Numeric(op)))))?;
    Ok(Assertion::numeric(dump_line, column, comparator, expected))
}

fn parse_text(
    op: TextOp,
    dump_line: usize,
    column: Column,
    line: &str,
    tokens: &[&str],
    missing: &dyn Fn(&str) -> Malformed,
) -> Result<Assertion, Malformed> {
    let expected = match column {
        Column::WholeLine => remainder_after(line, 3).to_string(),
        Column::Index(_) => {
            if let Some(extra) = tokens.get(4) {
                return Err(Malformed::new(format!("unexpected token '{extra}' after the expected value"))
                    .with_help("use column '_' to compare a whole line"));
            }
            tokens.get(3).map(|t| t.to_string()).unwrap_or_default()
        }
    };
    if expected.is_empty() && op.needs_expected() {
        return Err(missing("expected text"));
    }
    Ok(Assertion::text(dump_line, column, op, expected))
}

fn usage(comparator: Comparator) -> String {
    match comparator {
        Comparator::Numeric(NumericOp::Near) => "~= <line> <column> <expected> <tolerance>".to_string(),
        Comparator::Numeric(op) => format!("{} <line> <column> <expected>", op.symbol()),
        Comparator::Text(TextOp::IsNan) => "is_nan <line> <column>".to_string(),
        Comparator::Text(op) => format!("{} <line> <column|_> <expected text>", op.symbol()),
    }
}

fn kind_name(comparator: Comparator) -> &'static str {
    match comparator {
        Comparator::Numeric(_) => "numeric",
        Comparator::Text(_) => "string",
    }
}

// ============================================================================
// TEXT HELPERS
// ============================================================================

/// The rest of `line` after its first `n` whitespace-separated tokens, trimmed.
/// Internal whitespace is preserved.
pub fn remainder_after(line: &str, n: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..n {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest.trim_end()
}

/// Span of the non-blank part of a line starting at byte `start`.
fn line_span(line: &str, start: usize) -> SourceSpan {
    let leading = line.len() - line.trim_start().len();
    let len = line.trim().len().max(1);
    (start + leading, len).into()
}

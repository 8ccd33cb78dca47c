//! # Assertions
//!
//! One expectation about one position in a dump file.
//!
//! Evaluation reads the addressed token (or whole line), applies the bound
//! comparator, and records an [`Outcome`]. It never returns an error: anything
//! that prevents the comparison is recorded as [`Outcome::Crash`].

use std::fmt;

use crate::comparator::{BoundNumeric, TextOp};
use crate::dump::DumpArtifact;
use crate::errors::Crash;

/// Marker for "the whole line" in the column position.
pub const WHOLE_LINE_MARKER: &str = "_";

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Index(usize),
    WholeLine,
}

impl Column {
    pub fn parse(token: &str) -> Option<Self> {
        if token == WHOLE_LINE_MARKER {
            return Some(Column::WholeLine);
        }
        token.parse().ok().map(Column::Index)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Index(index) => write!(f, "{index}"),
            Column::WholeLine => f.write_str(WHOLE_LINE_MARKER),
        }
    }
}

/// A value read from a dump or written in a config file.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n:?}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A comparator paired with an expected value of the matching type.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    Numeric {
        comparator: BoundNumeric,
        expected: f64,
    },
    Text {
        op: TextOp,
        expected: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pending,
    Pass,
    Fail,
    Crash(Crash),
}

impl Outcome {
    pub fn tag(&self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::Crash(_) => "crash",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assertion {
    line: usize,
    column: Column,
    check: Check,
    actual: Option<Value>,
    outcome: Outcome,
}

// ============================================================================
// CONSTRUCTION AND ACCESSORS
// ============================================================================

impl Assertion {
    pub fn numeric(line: usize, column: Column, comparator: BoundNumeric, expected: f64) -> Self {
        Self::new(
            line,
            column,
            Check::Numeric {
                comparator,
                expected,
            },
        )
    }

    pub fn text(line: usize, column: Column, op: TextOp, expected: impl Into<String>) -> Self {
        Self::new(
            line,
            column,
            Check::Text {
                op,
                expected: expected.into(),
            },
        )
    }

    fn new(line: usize, column: Column, check: Check) -> Self {
        Self {
            line,
            column,
            check,
            actual: None,
            outcome: Outcome::Pending,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> Column {
        self.column
    }

    pub fn check(&self) -> &Check {
        &self.check
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.check, Check::Numeric { .. })
    }

    pub fn symbol(&self) -> &'static str {
        match &self.check {
            Check::Numeric { comparator, .. } => comparator.op().symbol(),
            Check::Text { op, .. } => op.symbol(),
        }
    }

    pub fn expected(&self) -> Value {
        match &self.check {
            Check::Numeric { expected, .. } => Value::Number(*expected),
            Check::Text { expected, .. } => Value::Text(expected.clone()),
        }
    }

    pub fn description(&self) -> String {
        match &self.check {
            Check::Numeric { comparator, .. } => comparator.to_string(),
            Check::Text { op, .. } => op.description().to_string(),
        }
    }

    /// The value read from the dump on the last run, if one was read.
    pub fn actual(&self) -> Option<&Value> {
        self.actual.as_ref()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn failed(&self) -> bool {
        matches!(self.outcome, Outcome::Fail | Outcome::Crash(_))
    }

    pub fn crashed(&self) -> bool {
        matches!(self.outcome, Outcome::Crash(_))
    }

    pub fn crash_reason(&self) -> Option<&Crash> {
        match &self.outcome {
            Outcome::Crash(crash) => Some(crash),
            _ => None,
        }
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

impl Assertion {
    pub fn reset(&mut self) {
        self.actual = None;
        self.outcome = Outcome::Pending;
    }

    /// Records a crash that happened before the dump could be read.
    pub fn mark_crashed(&mut self, crash: Crash) {
        self.actual = None;
        self.outcome = Outcome::Crash(crash);
    }

    pub fn evaluate(&mut self, dump: &DumpArtifact) -> &Outcome {
        self.reset();
        self.outcome = match self.read(dump) {
            Ok(actual) => {
                let holds = self.holds(&actual);
                self.actual = Some(actual);
                if holds {
                    Outcome::Pass
                } else {
                    Outcome::Fail
                }
            }
            Err(crash) => Outcome::Crash(crash),
        };
        &self.outcome
    }

    fn read(&self, dump: &DumpArtifact) -> Result<Value, Crash> {
        let out_of_range = || Crash::OutOfRange {
            line: self.line,
            column: self.column.to_string(),
            path: dump.path().to_path_buf(),
        };

        let text = dump.content_line(self.line).ok_or_else(out_of_range)?;
        let token = match self.column {
            Column::WholeLine => text.trim(),
            Column::Index(index) => text.split_whitespace().nth(index).ok_or_else(out_of_range)?,
        };

        if !self.is_numeric() {
            return Ok(Value::Text(token.to_string()));
        }
        token
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| Crash::NonNumeric {
                token: token.to_string(),
                line: self.line,
                column: self.column.to_string(),
                path: dump.path().to_path_buf(),
            })
    }

    fn holds(&self, actual: &Value) -> bool {
        match (&self.check, actual) {
            (Check::Numeric { comparator, expected }, Value::Number(actual)) => {
                comparator.holds(*actual, *expected)
            }
            (Check::Text { op, expected }, Value::Text(actual)) => op.holds(actual, expected),
            _ => false,
        }
    }

    /// One-line verdict: tag, coordinates, actual value, comparator, expected value.
    pub fn verdict(&self) -> String {
        let tag = match &self.outcome {
            Outcome::Crash(crash) => return format!("FAIL\t{crash}"),
            Outcome::Fail => "FAIL",
            Outcome::Pass => "pass",
            Outcome::Pending => "not run",
        };
        let actual = self
            .actual
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{tag}\tValue at Line {} Column {} ({actual}) {} {}",
            self.line,
            self.column,
            self.description(),
            self.expected()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::NumericOp;

    fn dump(text: &str) -> DumpArtifact {
        DumpArtifact::from_text("dumps/t.log", text)
    }

    #[test]
    fn column_parsing() {
        assert_eq!(Column::parse("_"), Some(Column::WholeLine));
        assert_eq!(Column::parse("3"), Some(Column::Index(3)));
        assert_eq!(Column::parse("-1"), None);
        assert_eq!(Column::parse("x"), None);
    }

    #[test]
    fn reevaluation_replaces_previous_result() {
        let mut a = Assertion::numeric(0, Column::Index(0), NumericOp::Equal.bind(&[]).unwrap(), 1.0);
        a.evaluate(&dump("h\n2\n"));
        assert!(a.failed());
        a.evaluate(&dump("h\n1\n"));
        assert_eq!(a.outcome(), &Outcome::Pass);
        assert_eq!(a.actual(), Some(&Value::Number(1.0)));
    }

    #[test]
    fn mark_crashed_clears_actual() {
        let mut a = Assertion::text(0, Column::WholeLine, TextOp::Is, "x");
        a.evaluate(&dump("h\nx\n"));
        a.mark_crashed(Crash::Spawn {
            command: "c".into(),
            message: "m".into(),
        });
        assert!(a.crashed() && a.failed());
        assert_eq!(a.actual(), None);
    }

    #[test]
    fn verdict_formats_pass_line() {
        let mut a = Assertion::numeric(2, Column::Index(0), NumericOp::Equal.bind(&[]).unwrap(), 5.0);
        a.evaluate(&dump("h\na\nb\n5.0 1.0\n"));
        assert_eq!(a.verdict(), "pass\tValue at Line 2 Column 0 (5.0) equal to 5.0");
    }
}

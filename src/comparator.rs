//! # Comparator Registry
//!
//! The fixed catalog of comparison operators usable in a config file.
//!
//! ## Operators Provided
//!
//! - **Numeric**: `=`, `>`, `<`, `>=`, `<=`, `!=`, `~=` (takes a tolerance)
//! - **String**: `is`, `has`, `is_nan` (all case-insensitive)
//!
//! Lookup is a `match` over the symbol, so the registry is total over its own
//! table and rejects everything else with `None`. Detecting unknown symbols is
//! the parser's job.

use std::fmt;

// ============================================================================
// REGISTRY
// ============================================================================

/// A registered comparator, resolved once while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Numeric(NumericOp),
    Text(TextOp),
}

/// How many auxiliary parameters a comparator needs beyond actual/expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Binary,
    Curried { params: usize },
}

impl Comparator {
    /// Every registered comparator, in listing order.
    pub const ALL: [Comparator; 10] = [
        Comparator::Numeric(NumericOp::Equal),
        Comparator::Numeric(NumericOp::Greater),
        Comparator::Numeric(NumericOp::Less),
        Comparator::Numeric(NumericOp::GreaterOrEqual),
        Comparator::Numeric(NumericOp::LessOrEqual),
        Comparator::Numeric(NumericOp::NotEqual),
        Comparator::Numeric(NumericOp::Near),
        Comparator::Text(TextOp::Is),
        Comparator::Text(TextOp::Has),
        Comparator::Text(TextOp::IsNan),
    ];

    /// Resolves a directive's leading token.
    pub fn lookup(symbol: &str) -> Option<Self> {
        let comparator = match symbol {
            "=" => Comparator::Numeric(NumericOp::Equal),
            ">" => Comparator::Numeric(NumericOp::Greater),
            "<" => Comparator::Numeric(NumericOp::Less),
            ">=" => Comparator::Numeric(NumericOp::GreaterOrEqual),
            "<=" => Comparator::Numeric(NumericOp::LessOrEqual),
            "!=" => Comparator::Numeric(NumericOp::NotEqual),
            "~=" => Comparator::Numeric(NumericOp::Near),
            "is" => Comparator::Text(TextOp::Is),
            "has" => Comparator::Text(TextOp::Has),
            "is_nan" => Comparator::Text(TextOp::IsNan),
            _ => return None,
        };
        Some(comparator)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Numeric(op) => op.symbol(),
            Comparator::Text(op) => op.symbol(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Comparator::Numeric(op) => op.description(),
            Comparator::Text(op) => op.description(),
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Comparator::Numeric(op) => op.arity(),
            Comparator::Text(_) => Arity::Binary,
        }
    }
}

// ============================================================================
// NUMERIC OPERATORS
// ============================================================================

/// Predicate over `(actual, expected, params)`.
pub type NumericPredicate = fn(f64, f64, &[f64]) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    Equal,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    NotEqual,
    /// `|actual - expected| <= tolerance`
    Near,
}

impl NumericOp {
    pub fn symbol(self) -> &'static str {
        match self {
            NumericOp::Equal => "=",
            NumericOp::Greater => ">",
            NumericOp::Less => "<",
            NumericOp::GreaterOrEqual => ">=",
            NumericOp::LessOrEqual => "<=",
            NumericOp::NotEqual => "!=",
            NumericOp::Near => "~=",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            NumericOp::Equal => "equal to",
            NumericOp::Greater => "greater than",
            NumericOp::Less => "less than",
            NumericOp::GreaterOrEqual => "greater than / equal to",
            NumericOp::LessOrEqual => "less than / equal to",
            NumericOp::NotEqual => "not equal to",
            NumericOp::Near => "nearly equal to",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            NumericOp::Near => Arity::Curried { params: 1 },
            _ => Arity::Binary,
        }
    }

    pub fn predicate(self) -> NumericPredicate {
        match self {
            NumericOp::Equal => num_eq,
            NumericOp::Greater => num_gt,
            NumericOp::Less => num_lt,
            NumericOp::GreaterOrEqual => num_ge,
            NumericOp::LessOrEqual => num_le,
            NumericOp::NotEqual => num_ne,
            NumericOp::Near => num_near,
        }
    }

    /// Applies the directive's trailing tokens, producing a comparator that
    /// only needs `(actual, expected)`.
    pub fn bind(self, extra: &[&str]) -> Result<BoundNumeric, BindError> {
        match self.arity() {
            Arity::Binary => {
                if let Some(first) = extra.first() {
                    return Err(BindError::UnexpectedParams {
                        symbol: self.symbol(),
                        found: (*first).to_string(),
                    });
                }
                Ok(BoundNumeric {
                    op: self,
                    params: Vec::new(),
                })
            }
            Arity::Curried { params } => {
                if extra.len() != params {
                    return Err(BindError::ParamCount {
                        symbol: self.symbol(),
                        expected: params,
                        found: extra.len(),
                    });
                }
                let values = extra
                    .iter()
                    .map(|token| parse_tolerance(self, token))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(BoundNumeric {
                    op: self,
                    params: values,
                })
            }
        }
    }
}

fn num_eq(actual: f64, expected: f64, _: &[f64]) -> bool {
    actual == expected
}

fn num_gt(actual: f64, expected: f64, _: &[f64]) -> bool {
    actual > expected
}

fn num_lt(actual: f64, expected: f64, _: &[f64]) -> bool {
    actual < expected
}

fn num_ge(actual: f64, expected: f64, _: &[f64]) -> bool {
    actual >= expected
}

fn num_le(actual: f64, expected: f64, _: &[f64]) -> bool {
    actual <= expected
}

fn num_ne(actual: f64, expected: f64, _: &[f64]) -> bool {
    actual != expected
}

/// Params are validated by [`NumericOp::bind`]; a missing tolerance never matches.
fn num_near(actual: f64, expected: f64, params: &[f64]) -> bool {
    params
        .first()
        .is_some_and(|tolerance| (actual - expected).abs() <= *tolerance)
}

fn parse_tolerance(op: NumericOp, token: &str) -> Result<f64, BindError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(BindError::InvalidParam {
            symbol: op.symbol(),
            token: token.to_string(),
        }),
    }
}

/// A numeric comparator with its auxiliary parameters applied.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundNumeric {
    op: NumericOp,
    params: Vec<f64>,
}

impl BoundNumeric {
    pub fn op(&self) -> NumericOp {
        self.op
    }

    pub fn params(&self) -> &[f64] {
        &self.params
    }

    pub fn holds(&self, actual: f64, expected: f64) -> bool {
        (self.op.predicate())(actual, expected, &self.params)
    }
}

impl fmt::Display for BoundNumeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op.description())?;
        for param in &self.params {
            write!(f, " (±{param})")?;
        }
        Ok(())
    }
}

/// Why a directive's trailing tokens could not be applied to a comparator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    #[error("'{symbol}' takes no extra arguments, found '{found}'")]
    UnexpectedParams { symbol: &'static str, found: String },
    #[error("'{symbol}' takes {expected} extra argument(s), found {found}")]
    ParamCount {
        symbol: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("'{symbol}' needs a non-negative number, found '{token}'")]
    InvalidParam { symbol: &'static str, token: String },
}

// ============================================================================
// STRING OPERATORS
// ============================================================================

/// Predicate over `(actual, expected)`.
pub type TextPredicate = fn(&str, &str) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Is,
    Has,
    /// Ignores the expected value.
    IsNan,
}

impl TextOp {
    pub fn symbol(self) -> &'static str {
        match self {
            TextOp::Is => "is",
            TextOp::Has => "has",
            TextOp::IsNan => "is_nan",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TextOp::Is | TextOp::IsNan => "is",
            TextOp::Has => "has",
        }
    }

    /// `is_nan` can be written without an expected token.
    pub fn needs_expected(self) -> bool {
        !matches!(self, TextOp::IsNan)
    }

    pub fn predicate(self) -> TextPredicate {
        match self {
            TextOp::Is => text_is,
            TextOp::Has => text_has,
            TextOp::IsNan => text_is_nan,
        }
    }

    pub fn holds(self, actual: &str, expected: &str) -> bool {
        (self.predicate())(actual, expected)
    }
}

fn text_is(actual: &str, expected: &str) -> bool {
    actual.to_lowercase() == expected.to_lowercase()
}

fn text_has(actual: &str, expected: &str) -> bool {
    actual.to_lowercase().contains(&expected.to_lowercase())
}

fn text_is_nan(actual: &str, _: &str) -> bool {
    actual.eq_ignore_ascii_case("nan")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_round_trips_every_symbol() {
        for comparator in Comparator::ALL {
            assert_eq!(Comparator::lookup(comparator.symbol()), Some(comparator));
        }
    }

    #[test]
    fn lookup_rejects_unknown_symbols() {
        for symbol in ["xyz", "==", "IS", "", "test:", "~"] {
            assert_eq!(Comparator::lookup(symbol), None, "{symbol}");
        }
    }

    #[test]
    fn near_is_curried_everything_else_binary() {
        for comparator in Comparator::ALL {
            let expected = if comparator.symbol() == "~=" {
                Arity::Curried { params: 1 }
            } else {
                Arity::Binary
            };
            assert_eq!(comparator.arity(), expected);
        }
    }

    #[test]
    fn near_uses_inclusive_tolerance() {
        let near = NumericOp::Near.bind(&["0.5"]).unwrap();
        assert!(near.holds(10.3, 10.0));
        assert!(near.holds(10.5, 10.0));
        assert!(near.holds(9.5, 10.0));
        assert!(!near.holds(10.51, 10.0));
        let exact = NumericOp::Near.bind(&["0"]).unwrap();
        assert!(exact.holds(2.0, 2.0));
        assert!(!exact.holds(2.0, 2.000001));
    }

    #[test]
    fn near_requires_one_valid_tolerance() {
        assert!(matches!(
            NumericOp::Near.bind(&[]),
            Err(BindError::ParamCount { found: 0, .. })
        ));
        assert!(matches!(
            NumericOp::Near.bind(&["1", "2"]),
            Err(BindError::ParamCount { found: 2, .. })
        ));
        assert!(matches!(
            NumericOp::Near.bind(&["-1"]),
            Err(BindError::InvalidParam { .. })
        ));
        assert!(matches!(
            NumericOp::Near.bind(&["abc"]),
            Err(BindError::InvalidParam { .. })
        ));
    }

    #[test]
    fn binary_ops_reject_extra_tokens() {
        assert!(matches!(
            NumericOp::Equal.bind(&["0.1"]),
            Err(BindError::UnexpectedParams { .. })
        ));
    }

    #[test]
    fn numeric_predicates() {
        let check = |op: NumericOp, a, e| op.bind(&[]).unwrap().holds(a, e);
        assert!(check(NumericOp::Equal, 5.0, 5.0));
        assert!(check(NumericOp::Greater, 6.0, 5.0));
        assert!(!check(NumericOp::Greater, 5.0, 5.0));
        assert!(check(NumericOp::Less, 4.0, 5.0));
        assert!(check(NumericOp::GreaterOrEqual, 5.0, 5.0));
        assert!(check(NumericOp::LessOrEqual, 5.0, 5.0));
        assert!(check(NumericOp::NotEqual, 4.0, 5.0));
        assert!(!check(NumericOp::NotEqual, 5.0, 5.0));
    }

    #[test]
    fn string_predicates_ignore_case() {
        assert!(TextOp::Is.holds("Done", "done"));
        assert!(!TextOp::Is.holds("done!", "done"));
        assert!(TextOp::Has.holds("No Problems Found", "problems"));
        assert!(!TextOp::Has.holds("no problems found", "\"error\""));
        assert!(TextOp::IsNan.holds("NaN", "anything"));
        assert!(!TextOp::IsNan.holds("0.0", "nan"));
    }
}

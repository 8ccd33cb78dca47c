//! Machine-readable summary of a finished suite, written with `--report`.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::assertion::{Assertion, Value};
use crate::case::TestCase;
use crate::errors::HarnessError;
use crate::file::TestFile;
use crate::suite::TestSuite;

#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub passed: bool,
    pub files: Vec<FileReport>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub seed: u32,
    pub passed: bool,
    pub summary: String,
    pub cases: Vec<CaseReport>,
}

#[derive(Debug, Serialize)]
pub struct CaseReport {
    pub command: String,
    pub dump: Option<String>,
    pub passed: bool,
    pub crashed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crash: Option<String>,
    pub assertions: Vec<AssertionReport>,
}

#[derive(Debug, Serialize)]
pub struct AssertionReport {
    pub line: usize,
    pub column: String,
    pub comparator: &'static str,
    pub expected: serde_json::Value,
    pub actual: Option<serde_json::Value>,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crash: Option<String>,
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(n.to_string())),
        Value::Text(s) => serde_json::Value::String(s.clone()),
    }
}

impl From<&Assertion> for AssertionReport {
    fn from(assertion: &Assertion) -> Self {
        Self {
            line: assertion.line(),
            column: assertion.column().to_string(),
            comparator: assertion.symbol(),
            expected: json_value(&assertion.expected()),
            actual: assertion.actual().map(json_value),
            outcome: assertion.outcome().tag(),
            crash: assertion.crash_reason().map(ToString::to_string),
        }
    }
}

impl From<&TestCase> for CaseReport {
    fn from(case: &TestCase) -> Self {
        Self {
            command: case.command_line().unwrap_or(case.invocation()).to_string(),
            dump: case.dump_path().map(|p| p.display().to_string()),
            passed: !case.failed(),
            crashed: case.crashed(),
            crash: case.crash_reason().map(ToString::to_string),
            assertions: case.assertions().iter().map(AssertionReport::from).collect(),
        }
    }
}

impl From<&TestFile> for FileReport {
    fn from(file: &TestFile) -> Self {
        Self {
            path: file.path().display().to_string(),
            seed: file.seed(),
            passed: !file.failed(),
            summary: file.summary(),
            cases: file.cases().iter().map(CaseReport::from).collect(),
        }
    }
}

impl From<&TestSuite> for SuiteReport {
    fn from(suite: &TestSuite) -> Self {
        Self {
            passed: !suite.failed(),
            files: suite.test_files().values().map(FileReport::from).collect(),
            errors: suite.errors().iter().map(ToString::to_string).collect(),
        }
    }
}

impl SuiteReport {
    pub fn to_json(&self) -> Result<String, HarnessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), HarnessError> {
        fs::write(path, self.to_json()?).map_err(|source| HarnessError::Report {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::Column;
    use crate::comparator::{NumericOp, TextOp};
    use crate::dump::DumpArtifact;

    #[test]
    fn assertion_report_carries_outcome() {
        let mut a = Assertion::numeric(0, Column::Index(1), NumericOp::Greater.bind(&[]).unwrap(), 2.0);
        a.evaluate(&DumpArtifact::from_text("d.log", "% header\n1 3\n"));
        let report = AssertionReport::from(&a);
        assert_eq!(report.outcome, "pass");
        assert_eq!(report.comparator, ">");
        assert_eq!(report.actual, Some(serde_json::json!(3.0)));
    }

    #[test]
    fn crash_is_serialized_only_when_present() {
        let mut a = Assertion::text(5, Column::WholeLine, TextOp::Is, "x");
        a.evaluate(&DumpArtifact::from_text("d.log", "% header\n"));
        let json = serde_json::to_value(AssertionReport::from(&a)).unwrap();
        assert_eq!(json["outcome"], "crash");
        assert!(json["crash"].as_str().unwrap().contains("index out of bounds"));

        let b = Assertion::text(0, Column::WholeLine, TextOp::Is, "x");
        let json = serde_json::to_value(AssertionReport::from(&b)).unwrap();
        assert!(json.get("crash").is_none());
    }
}

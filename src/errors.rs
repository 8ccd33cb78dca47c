//! # Error Types
//!
//! Two families of failure live here:
//!
//! - [`Crash`]: an infrastructure failure that stops an assertion from being
//!   evaluated. Crashes are recorded as results, never propagated past a
//!   test case.
//! - [`HarnessError`]: a fatal problem in the outer shell (no config files,
//!   a log that cannot be written). These end the process with status 1.
//!
//! Problems inside a config file are reported as [`ConfigDiagnostic`]s, which
//! are rendered through `miette` and never abort parsing.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub mod diagnostic;

pub use diagnostic::ConfigDiagnostic;

/// Why a test case or assertion could not be evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Crash {
    #[error("target terminated with a non-zero return code {}: {command}", display_code(.code))]
    NonZeroExit { code: Option<i32>, command: String },

    #[error("target timed out after {seconds}s: {command}")]
    Timeout { seconds: u64, command: String },

    #[error("could not launch '{command}': {message}")]
    Spawn { command: String, message: String },

    #[error("could not find the dumpfile. Searched for {prefix}*{suffix} in {}", .dir.display())]
    MissingDump {
        prefix: String,
        suffix: String,
        dir: PathBuf,
    },

    #[error("could not list dump directory {}: {message}", .dir.display())]
    DumpDirUnreadable { dir: PathBuf, message: String },

    #[error("could not remove stale dumpfile {}: {message}", .path.display())]
    StaleDump { path: PathBuf, message: String },

    #[error("could not read dumpfile {}: {message}", .path.display())]
    DumpUnreadable { path: PathBuf, message: String },

    #[error(
        "index out of bounds (line/column numbering starts at 0). Trying to access line {line}, column {column} in {}",
        .path.display()
    )]
    OutOfRange {
        line: usize,
        column: String,
        path: PathBuf,
    },

    #[error(
        "non-numeric value '{token}' found (this assertion is numeric). Trying to access line {line}, column {column} in {}",
        .path.display()
    )]
    NonNumeric {
        token: String,
        line: usize,
        column: String,
        path: PathBuf,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "(killed by signal)".to_string(),
    }
}

/// Fatal errors of the harness itself.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("no test files found")]
    #[diagnostic(
        code(prototest::no_config),
        help("pass one or more files ending in '.test', or a directory containing them")
    )]
    NoConfigFiles,

    #[error("could not read config file {}", .path.display())]
    #[diagnostic(code(prototest::config_unreadable))]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not scan directory {}: {message}", .path.display())]
    #[diagnostic(code(prototest::discovery))]
    Discovery { path: PathBuf, message: String },

    #[error("could not write results log {}", .path.display())]
    #[diagnostic(code(prototest::results_log))]
    ResultsLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write report {}", .path.display())]
    #[diagnostic(code(prototest::report))]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize report: {0}")]
    #[diagnostic(code(prototest::report))]
    ReportEncoding(#[from] serde_json::Error),

    #[error("could not initialise logging: {0}")]
    #[diagnostic(code(prototest::logging))]
    Logging(String),
}

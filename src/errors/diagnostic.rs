//! Diagnostics for malformed config directives.
//!
//! Every diagnostic points at the offending line of the config file so
//! `miette` can render it with context. None of them abort parsing.

use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Shared handle to a config file's text, used as diagnostic source code.
pub type ConfigSource = Arc<NamedSource<String>>;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigDiagnostic {
    #[error("line {line_number}: unrecognized command '{command}'")]
    #[diagnostic(
        code(prototest::config::unrecognized),
        severity(Warning),
        help("directives start with 'test:', '//', or a comparator such as '=', '~=', 'is' or 'has'")
    )]
    UnrecognizedDirective {
        command: String,
        line_number: usize,
        #[source_code]
        src: ConfigSource,
        #[label("ignored")]
        span: SourceSpan,
    },

    #[error("line {line_number}: malformed assertion: {reason}")]
    #[diagnostic(code(prototest::config::malformed), severity(Warning))]
    MalformedAssertion {
        reason: String,
        line_number: usize,
        #[source_code]
        src: ConfigSource,
        #[label("skipped")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("line {line_number}: assertion appears before any 'test:' line")]
    #[diagnostic(
        code(prototest::config::orphan),
        severity(Warning),
        help("start a test case with 'test: <arguments>' before adding assertions")
    )]
    OrphanAssertion {
        line_number: usize,
        #[source_code]
        src: ConfigSource,
        #[label("no open test case")]
        span: SourceSpan,
    },
}

impl ConfigDiagnostic {
    /// True when rendered as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self.severity(), Some(miette::Severity::Warning))
    }

    /// The 1-based config line the diagnostic refers to.
    pub fn line_number(&self) -> usize {
        match self {
            ConfigDiagnostic::UnrecognizedDirective { line_number, .. }
            | ConfigDiagnostic::MalformedAssertion { line_number, .. }
            | ConfigDiagnostic::OrphanAssertion { line_number, .. } => *line_number,
        }
    }
}

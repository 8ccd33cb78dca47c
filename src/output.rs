//! Handles all user-facing console output for a run.
//!
//! The suite and its files report progress through the [`Reporter`] trait.
//! [`ConsoleReporter`] prints colored progress to stdout and config
//! diagnostics to stderr; [`OutputBuffer`] collects plain lines for tests and
//! programmatic capture.

use std::io::Write;
use std::path::Path;

use miette::GraphicalReportHandler;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::case::TestCase;
use crate::file::TestFile;

/// Progress callbacks. Every method defaults to doing nothing.
pub trait Reporter {
    fn file_parsed(&mut self, _file: &TestFile) {}
    fn file_skipped(&mut self, _path: &Path, _reason: &str) {}
    fn file_started(&mut self, _file: &TestFile) {}
    fn case_finished(&mut self, _completed: usize, _case: &TestCase) {}
    fn file_finished(&mut self, _file: &TestFile) {}
}

// ============================================================================
// CONSOLE
// ============================================================================

/// Writes progress to stdout, colored when stdout is a terminal.
pub struct ConsoleReporter {
    stdout: StandardStream,
    verbosity: u8,
}

impl ConsoleReporter {
    pub fn new(verbosity: u8) -> Self {
        let choice = if atty::is(atty::Stream::Stdout) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stdout: StandardStream::stdout(choice),
            verbosity,
        }
    }

    fn colored(&mut self, text: &str, color: Color) {
        let _ = self.stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(self.stdout, "{text}");
        let _ = self.stdout.reset();
    }
}

impl Reporter for ConsoleReporter {
    fn file_parsed(&mut self, file: &TestFile) {
        if self.verbosity > 0 {
            let _ = writeln!(
                self.stdout,
                "Parsing {}... {} tests found",
                file.path().display(),
                file.cases().len()
            );
        }
        let handler = GraphicalReportHandler::new();
        for diagnostic in file.diagnostics() {
            let mut rendered = String::new();
            match handler.render_report(&mut rendered, diagnostic) {
                Ok(()) => eprint!("{rendered}"),
                Err(_) => eprintln!("{diagnostic}"),
            }
        }
    }

    fn file_skipped(&mut self, path: &Path, reason: &str) {
        self.colored("Warning: ", Color::Yellow);
        let _ = writeln!(self.stdout, "{reason} in {}", path.display());
    }

    fn file_started(&mut self, file: &TestFile) {
        let _ = write!(self.stdout, "Running {}  ", file.path().display());
        let _ = self.stdout.flush();
    }

    fn case_finished(&mut self, completed: usize, _case: &TestCase) {
        if completed == 1 || completed % 5 == 0 {
            let _ = write!(self.stdout, ".");
            let _ = self.stdout.flush();
        }
    }

    fn file_finished(&mut self, file: &TestFile) {
        if file.failed() {
            self.colored(" FAILED", Color::Red);
            let _ = writeln!(self.stdout, " {} out of {} tests", file.failed_count(), file.cases().len());
        } else {
            self.colored(" passed", Color::Green);
            let _ = writeln!(self.stdout, " all {} tests", file.cases().len());
        }
    }
}

// ============================================================================
// BUFFER
// ============================================================================

/// Collects one plain line per event.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    pub lines: Vec<String>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_text(&self) -> String {
        self.lines.join("\n")
    }
}

impl Reporter for OutputBuffer {
    fn file_parsed(&mut self, file: &TestFile) {
        self.lines.push(format!(
            "parsed {} ({} cases, {} diagnostics)",
            file.path().display(),
            file.cases().len(),
            file.diagnostics().len()
        ));
    }

    fn file_skipped(&mut self, path: &Path, reason: &str) {
        self.lines.push(format!("skipped {}: {reason}", path.display()));
    }

    fn file_started(&mut self, file: &TestFile) {
        self.lines.push(format!("running {}", file.path().display()));
    }

    fn case_finished(&mut self, completed: usize, case: &TestCase) {
        let verdict = if case.crashed() {
            "crash"
        } else if case.failed() {
            "fail"
        } else {
            "pass"
        };
        self.lines.push(format!("case {completed}: {verdict}"));
    }

    fn file_finished(&mut self, file: &TestFile) {
        self.lines.push(format!("finished {}: {}", file.path().display(), file.summary()));
    }
}

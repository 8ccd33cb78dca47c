//! # Test Files
//!
//! A test file owns the cases parsed from one config file. It runs them in
//! order and writes a `<name>.RESULTS` log next to the other results.

use std::fs;
use std::path::{Path, PathBuf};

use crate::case::TestCase;
use crate::config::HarnessConfig;
use crate::errors::{ConfigDiagnostic, HarnessError};
use crate::launcher::Launcher;
use crate::output::Reporter;
use crate::parser::ConfigParser;

pub const RESULTS_EXTENSION: &str = "RESULTS";
const RULE_WIDTH: usize = 80;

#[derive(Debug)]
pub struct TestFile {
    path: PathBuf,
    seed: u32,
    cases: Vec<TestCase>,
    diagnostics: Vec<ConfigDiagnostic>,
    failed: bool,
}

impl TestFile {
    /// Reads and parses the config file at `path`.
    pub fn load(path: impl Into<PathBuf>, seed: u32, config: &HarnessConfig) -> Result<Self, HarnessError> {
        let path = path.into();
        let source = fs::read_to_string(&path).map_err(|source| HarnessError::ConfigUnreadable {
            path: path.clone(),
            source,
        })?;
        Ok(Self::from_source(path, &source, seed, config))
    }

    pub fn from_source(path: impl Into<PathBuf>, source: &str, seed: u32, config: &HarnessConfig) -> Self {
        let path = path.into();
        let parsed = ConfigParser::new(path.display().to_string(), source, seed)
            .quiet(config.is_quiet())
            .parse();
        Self {
            path,
            seed,
            cases: parsed.cases,
            diagnostics: parsed.diagnostics,
            failed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn diagnostics(&self) -> &[ConfigDiagnostic] {
        &self.diagnostics
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn failed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.failed()).count()
    }

    /// Runs every case in order. Returns `true` when all of them passed.
    pub fn run(&mut self, config: &HarnessConfig, launcher: &dyn Launcher, reporter: &mut dyn Reporter) -> bool {
        self.failed = false;
        reporter.file_started(self);
        for (index, case) in self.cases.iter_mut().enumerate() {
            case.run(config, launcher);
            if case.failed() {
                self.failed = true;
            }
            reporter.case_finished(index + 1, case);
        }
        reporter.file_finished(self);
        !self.failed
    }

    /// One-line summary used as the head of the results log.
    pub fn summary(&self) -> String {
        let passed = self.cases.len() - self.failed_count();
        if passed == self.cases.len() {
            "All tests Passed".to_string()
        } else {
            format!("Passed {} out of {} tests.", passed, self.cases.len())
        }
    }

    /// Body of the results log. Passing cases are only detailed when
    /// `verbosity` is at least 1.
    pub fn render_log(&self, verbosity: u8) -> String {
        let mut log = vec![self.summary()];
        for (index, case) in self.cases.iter().enumerate() {
            if verbosity < 1 && !case.failed() {
                continue;
            }
            let dump_path = case
                .dump_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string());
            log.push(format!("Test #{index}"));
            log.push(format!(
                "Running with arguments: {}",
                case.command_line().unwrap_or(case.invocation())
            ));
            log.push(format!("Dump file path: {dump_path}"));
            if !case.ignored_dumps().is_empty() {
                let ignored: Vec<String> = case.ignored_dumps().iter().map(|p| p.display().to_string()).collect();
                log.push(format!("Ignored dump files: {}", ignored.join(", ")));
            }
            log.push("\n***PROCESS OUTPUT***".to_string());
            log.push(case.process_output().combined());
            log.push("***END PROCESS OUTPUT***\n".to_string());
            log.push(case.report());
            log.push("-".repeat(RULE_WIDTH));
        }
        log.join("\n")
    }

    /// `<results_dir>/<config file name>.RESULTS`
    pub fn results_path(&self, results_dir: &Path) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config".to_string());
        results_dir.join(format!("{name}.{RESULTS_EXTENSION}"))
    }

    pub fn write_log(&self, config: &HarnessConfig) -> Result<PathBuf, HarnessError> {
        let path = self.results_path(&config.results_dir);
        fs::write(&path, self.render_log(config.verbosity)).map_err(|source| HarnessError::ResultsLog {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(log = %path.display(), "wrote results log");
        Ok(path)
    }
}

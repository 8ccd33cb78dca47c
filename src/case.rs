//! # Test Cases
//!
//! A test case is one invocation of the target plus the assertions made on
//! the dump file it writes. Running a case never fails: every problem is
//! recorded as a [`Crash`] on the case and on each of its assertions.

use std::path::PathBuf;

use crate::assertion::Assertion;
use crate::config::HarnessConfig;
use crate::dump::{clear_stale_dumps, locate_dump, DumpArtifact, DumpMatch};
use crate::errors::Crash;
use crate::launcher::{Launcher, ProcessOutput};

#[derive(Debug, Clone)]
pub struct TestCase {
    invocation: String,
    dump_prefix: String,
    assertions: Vec<Assertion>,
    // Results of the last run
    command_line: Option<String>,
    dump: Option<DumpMatch>,
    process_output: ProcessOutput,
    failed: bool,
    crash: Option<Crash>,
}

impl TestCase {
    /// `invocation` may contain `$(PROTO)`, `$(P2B)` and `$(DEMOS)`.
    pub fn new(invocation: impl Into<String>, dump_prefix: impl Into<String>) -> Self {
        Self {
            invocation: invocation.into(),
            dump_prefix: dump_prefix.into(),
            assertions: Vec::new(),
            command_line: None,
            dump: None,
            process_output: ProcessOutput::default(),
            failed: false,
            crash: None,
        }
    }

    pub fn add(&mut self, assertion: Assertion) {
        self.assertions.push(assertion);
    }

    pub fn invocation(&self) -> &str {
        &self.invocation
    }

    pub fn dump_prefix(&self) -> &str {
        &self.dump_prefix
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    /// The command line actually launched on the last run.
    pub fn command_line(&self) -> Option<&str> {
        self.command_line.as_deref()
    }

    pub fn dump_path(&self) -> Option<&PathBuf> {
        self.dump.as_ref().map(|m| &m.path)
    }

    /// Dump files that matched the prefix but were not used.
    pub fn ignored_dumps(&self) -> &[PathBuf] {
        self.dump.as_ref().map(|m| m.ambiguous.as_slice()).unwrap_or(&[])
    }

    pub fn process_output(&self) -> &ProcessOutput {
        &self.process_output
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn crashed(&self) -> bool {
        self.crash.is_some()
    }

    pub fn crash_reason(&self) -> Option<&Crash> {
        self.crash.as_ref()
    }

    pub fn failed_assertions(&self) -> impl Iterator<Item = &Assertion> {
        self.assertions.iter().filter(|a| a.failed())
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Clears every result left by a previous run.
    pub fn reset(&mut self) {
        self.command_line = None;
        self.dump = None;
        self.process_output = ProcessOutput::default();
        self.failed = false;
        self.crash = None;
        for assertion in &mut self.assertions {
            assertion.reset();
        }
    }

    /// Launches the target, finds its dump, and evaluates every assertion.
    pub fn run(&mut self, config: &HarnessConfig, launcher: &dyn Launcher) {
        self.reset();
        let command_line = config.substitute_paths(&self.invocation);
        self.command_line = Some(command_line.clone());

        match self.execute(&command_line, config, launcher) {
            Ok(dump) => {
                for assertion in &mut self.assertions {
                    assertion.evaluate(&dump);
                }
                self.failed = self.assertions.iter().any(Assertion::failed);
            }
            Err(crash) => self.crashed_with(crash),
        }
        tracing::debug!(
            prefix = %self.dump_prefix,
            failed = self.failed,
            crashed = self.crashed(),
            "test case finished"
        );
    }

    fn execute(
        &mut self,
        command_line: &str,
        config: &HarnessConfig,
        launcher: &dyn Launcher,
    ) -> Result<DumpArtifact, Crash> {
        let dump_dir = config.dump_dir();
        clear_stale_dumps(&dump_dir, &self.dump_prefix, &config.dump_suffix)?;
        let output = launcher.launch(command_line, config.timeout)?;
        let success = output.success();
        let code = output.code;
        self.process_output = output;
        if !success {
            return Err(Crash::NonZeroExit {
                code,
                command: command_line.to_string(),
            });
        }

        let found = locate_dump(&dump_dir, &self.dump_prefix, &config.dump_suffix)?;
        let dump = DumpArtifact::load(&found.path);
        self.dump = Some(found);
        dump
    }

    fn crashed_with(&mut self, crash: Crash) {
        tracing::info!(prefix = %self.dump_prefix, "test case crashed: {crash}");
        for assertion in &mut self.assertions {
            assertion.mark_crashed(crash.clone());
        }
        self.failed = true;
        self.crash = Some(crash);
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    /// Multi-line summary of the last run.
    pub fn report(&self) -> String {
        if let Some(crash) = &self.crash {
            return crash.to_string();
        }
        if !self.failed {
            return "All assertions passed.".to_string();
        }
        let failures: Vec<&Assertion> = self.failed_assertions().collect();
        let mut out = vec![format!(
            "FAIL: Failed {} out of {} assertions.",
            failures.len(),
            self.assertions.len()
        )];
        out.extend(failures.iter().map(|a| a.verdict()));
        out.join("\n")
    }
}

//! # Prototest Test Helpers
//!
//! Fake launchers that stand in for the simulator, plus config builders that
//! point the harness at a scratch dump directory.

#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use prototest::{Crash, HarnessConfig, ProcessOutput};

/// Header line every simulator dump starts with.
pub const DUMP_HEADER: &str = "% time 1.00 devices 2";

/// A config that searches `dump_dir` for dumps and writes logs to `results_dir`.
pub fn config_in(dump_dir: &Path, results_dir: &Path) -> HarnessConfig {
    HarnessConfig {
        dump_dir: Some(dump_dir.to_path_buf()),
        results_dir: results_dir.to_path_buf(),
        seed: Some(7),
        ..HarnessConfig::default()
    }
}

/// The stem the parser injected after `-dump-stem`.
pub fn stem_of(command_line: &str) -> String {
    let tokens: Vec<&str> = command_line.split_whitespace().collect();
    let at = tokens
        .iter()
        .position(|t| *t == "-dump-stem")
        .expect("command line has no -dump-stem");
    tokens[at + 1].to_string()
}

pub fn exited(code: i32, stdout: &str) -> ProcessOutput {
    ProcessOutput {
        code: Some(code),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// A launcher that writes `body` (after the header) as the dump for every run.
pub fn dumping_launcher(
    dump_dir: PathBuf,
    body: &'static str,
) -> impl Fn(&str, Option<Duration>) -> Result<ProcessOutput, Crash> {
    move |command_line: &str, _timeout: Option<Duration>| -> Result<ProcessOutput, Crash> {
        let path = dump_dir.join(format!("{}1.00.log", stem_of(command_line)));
        fs::write(&path, format!("{DUMP_HEADER}\n{body}")).expect("write dump");
        Ok(exited(0, "simulated\n"))
    }
}

/// A launcher that exits with `code` and writes nothing.
pub fn exiting_launcher(code: i32) -> impl Fn(&str, Option<Duration>) -> Result<ProcessOutput, Crash> {
    move |_command_line: &str, _timeout: Option<Duration>| -> Result<ProcessOutput, Crash> {
        Ok(exited(code, "boom\n"))
    }
}

/// Counts how often it was called; used to check that nothing ran.
pub struct CountingLauncher {
    pub calls: Cell<usize>,
}

impl CountingLauncher {
    pub fn new() -> Self {
        Self { calls: Cell::new(0) }
    }
}

impl prototest::Launcher for CountingLauncher {
    fn launch(&self, _command_line: &str, _timeout: Option<Duration>) -> Result<ProcessOutput, Crash> {
        self.calls.set(self.calls.get() + 1);
        Ok(exited(0, ""))
    }
}

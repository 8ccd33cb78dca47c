//! # Harness Configuration
//!
//! A single immutable [`HarnessConfig`] is built once by the CLI and passed by
//! reference to the suite, each test file, and each test case. Nothing in the
//! harness reads process-wide mutable state.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default relative path to the simulator executable.
pub const DEFAULT_PROTO_PATH: &str = "../proto";
/// Default relative path to the compiler executable.
pub const DEFAULT_P2B_PATH: &str = "../p2b";
/// Default relative path to the demo programs.
pub const DEFAULT_DEMOS_PATH: &str = "../../demos";
/// Suffix of the dump files written by the simulator.
pub const DEFAULT_DUMP_SUFFIX: &str = ".log";
/// Directory searched for dump files when none is configured.
pub const DEFAULT_DUMP_DIR: &str = "dumps";
/// Extension of a test config file.
pub const CONFIG_EXTENSION: &str = ".test";

/// Configuration shared by every level of the test hierarchy.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// 0 is quiet (tests run headless), 1 is the default, 3 and above traces the parser.
    pub verbosity: u8,
    /// Where dump files are searched for. `None` means `./dumps`.
    pub dump_dir: Option<PathBuf>,
    /// Substituted for `$(PROTO)` in test invocations.
    pub proto_path: String,
    /// Substituted for `$(P2B)` in test invocations.
    pub p2b_path: String,
    /// Substituted for `$(DEMOS)` in test invocations.
    pub demos_path: String,
    pub dump_suffix: String,
    /// Where `<config>.RESULTS` logs are written.
    pub results_dir: PathBuf,
    /// Upper bound on a single test process. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Fixes the per-file seeds so dump stems are reproducible.
    pub seed: Option<u64>,
    /// Descend into subdirectories when a directory is given.
    pub recursive: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            verbosity: 1,
            dump_dir: None,
            proto_path: DEFAULT_PROTO_PATH.to_string(),
            p2b_path: DEFAULT_P2B_PATH.to_string(),
            demos_path: DEFAULT_DEMOS_PATH.to_string(),
            dump_suffix: DEFAULT_DUMP_SUFFIX.to_string(),
            results_dir: PathBuf::from("."),
            timeout: None,
            seed: None,
            recursive: false,
        }
    }
}

impl HarnessConfig {
    /// The directory dump files are searched in.
    pub fn dump_dir(&self) -> PathBuf {
        match &self.dump_dir {
            Some(dir) => dir.clone(),
            None => Path::new(".").join(DEFAULT_DUMP_DIR),
        }
    }

    /// Quiet mode makes every test headless.
    pub fn is_quiet(&self) -> bool {
        self.verbosity == 0
    }

    /// Replaces the `$(PROTO)`, `$(P2B)` and `$(DEMOS)` placeholders.
    pub fn substitute_paths(&self, template: &str) -> String {
        template
            .replace("$(PROTO)", &self.proto_path)
            .replace("$(P2B)", &self.p2b_path)
            .replace("$(DEMOS)", &self.demos_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_every_placeholder() {
        let config = HarnessConfig {
            proto_path: "/opt/proto".into(),
            p2b_path: "/opt/p2b".into(),
            demos_path: "/srv/demos".into(),
            ..HarnessConfig::default()
        };
        let line = config.substitute_paths("$(PROTO) $(DEMOS)/a.proto -D && $(P2B) $(PROTO)");
        assert_eq!(line, "/opt/proto /srv/demos/a.proto -D && /opt/p2b /opt/proto");
    }

    #[test]
    fn default_dump_dir_is_relative_dumps() {
        let config = HarnessConfig::default();
        assert_eq!(config.dump_dir(), Path::new(".").join("dumps"));
        assert!(!config.is_quiet());
    }
}

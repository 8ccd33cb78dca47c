//! Command-line arguments for the `prototest` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{HarnessConfig, DEFAULT_DEMOS_PATH, DEFAULT_P2B_PATH, DEFAULT_PROTO_PATH};

#[derive(Debug, Parser)]
#[command(
    name = "prototest",
    version,
    about = "Runs the simulator against .test config files and checks its dump output."
)]
pub struct PrototestArgs {
    /// Config files (`*.test`) or directories containing them.
    #[arg(required_unless_present = "list_comparators")]
    pub paths: Vec<PathBuf>,

    /// 0 runs every test headless; 2 and above prints diagnostic messages.
    #[arg(short, long = "verbose", value_name = "N", default_value_t = 1)]
    pub verbosity: u8,

    /// Descend into subdirectories of directory arguments.
    #[arg(short, long)]
    pub recursive: bool,

    /// Directory the simulator writes dump files to.
    #[arg(short = 'd', long = "dumpdir", value_name = "DIR")]
    pub dump_dir: Option<PathBuf>,

    /// Substituted for $(PROTO).
    #[arg(long = "proto", value_name = "PATH", default_value = DEFAULT_PROTO_PATH)]
    pub proto_path: String,

    /// Substituted for $(P2B).
    #[arg(long = "p2b", value_name = "PATH", default_value = DEFAULT_P2B_PATH)]
    pub p2b_path: String,

    /// Substituted for $(DEMOS).
    #[arg(long = "demos", value_name = "PATH", default_value = DEFAULT_DEMOS_PATH)]
    pub demos_path: String,

    /// Where the <config>.RESULTS logs are written.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub results_dir: PathBuf,

    /// Kill any test that runs longer than this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fix the dump stem seeds so runs are reproducible.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Also write a JSON report of every result.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Print the assertion comparators and exit.
    #[arg(long)]
    pub list_comparators: bool,
}

impl PrototestArgs {
    pub fn to_config(&self) -> HarnessConfig {
        HarnessConfig {
            verbosity: self.verbosity,
            dump_dir: self.dump_dir.clone(),
            proto_path: self.proto_path.clone(),
            p2b_path: self.p2b_path.clone(),
            demos_path: self.demos_path.clone(),
            results_dir: self.results_dir.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            seed: self.seed,
            recursive: self.recursive,
            ..HarnessConfig::default()
        }
    }
}

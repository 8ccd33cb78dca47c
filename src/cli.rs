//! The Prototest command-line interface.
//!
//! Parses arguments, runs the suite, and maps the result to the process exit
//! status: 0 when every assertion passed, 1 otherwise.

use std::process::ExitCode;

use clap::Parser;

use crate::comparator::{Arity, Comparator};
use crate::errors::HarnessError;
use crate::launcher::ShellLauncher;
use crate::logging;
use crate::output::ConsoleReporter;
use crate::report::SuiteReport;
use crate::suite::TestSuite;

pub mod args;

use args::PrototestArgs;

pub const BANNER: &str = concat!("Prototest ", env!("CARGO_PKG_VERSION"));

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

pub fn run() -> ExitCode {
    let args = PrototestArgs::parse();
    println!("{BANNER}");

    if args.list_comparators {
        print_comparators();
        return ExitCode::SUCCESS;
    }

    match run_suite(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::FAILURE
        }
    }
}

fn run_suite(args: &PrototestArgs) -> Result<bool, HarnessError> {
    let config = args.to_config();
    logging::init(config.verbosity)?;
    let mut reporter = ConsoleReporter::new(config.verbosity);

    println!("PARSING TEST FILE(s)");
    let mut suite = TestSuite::discover(&args.paths, &config)?;
    println!("Found {} test files.", suite.config_paths().len());
    suite.gen_tests(&config, &mut reporter);

    println!("RUNNING TEST(s)");
    let passed = suite.run(&config, &ShellLauncher, &mut reporter);

    if let Some(path) = &args.report {
        SuiteReport::from(&suite).write(path)?;
        tracing::info!(report = %path.display(), "wrote JSON report");
    }
    Ok(passed)
}

fn print_comparators() {
    for comparator in Comparator::ALL {
        let usage = match comparator.arity() {
            Arity::Binary => String::new(),
            Arity::Curried { params } => format!(" (+{params} parameter)"),
        };
        println!("  {:<7} {}{usage}", comparator.symbol(), comparator.description());
    }
}

pub use crate::errors::{ConfigDiagnostic, Crash, HarnessError};

pub mod assertion;
pub mod case;
pub mod cli;
pub mod comparator;
pub mod config;
pub mod dump;
pub mod errors;
pub mod file;
pub mod launcher;
pub mod logging;
pub mod output;
pub mod parser;
pub mod report;
pub mod suite;

pub use crate::assertion::{Assertion, Column, Outcome, Value};
pub use crate::case::TestCase;
pub use crate::config::HarnessConfig;
pub use crate::file::TestFile;
pub use crate::launcher::{Launcher, ProcessOutput, ShellLauncher};
pub use crate::suite::TestSuite;

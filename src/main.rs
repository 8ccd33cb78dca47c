use std::process::ExitCode;

fn main() -> ExitCode {
    prototest::cli::run()
}

//! Command-line entry point for `adrlist`.

use std::process::ExitCode;

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> ExitCode {
    Cli::parse().run()
}

use std::process::ExitCode;

use clap::Parser;

use drainroute::cli::Cli;

fn main() -> ExitCode {
    Cli::parse().run()
}

//! `certctl` — command-line entry point.
//!
//! Startup sequence:
//! 1. Parse arguments.
//! 2. Initialise stderr logging.
//! 3. Run the subcommand; a rejected token exits with status 1, any other
//!    failure (including a missing or malformed key) with status 2.

mod commands;
mod config;
mod telemetry;

use std::process::ExitCode;

use clap::Parser;

use commands::Outcome;
use config::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("ERROR: {e:#}");
        return ExitCode::from(2);
    }

    let mut stdout = std::io::stdout().lock();
    match commands::run(cli, &mut stdout) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Rejected) => ExitCode::from(1),
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::from(2)
        }
    }
}

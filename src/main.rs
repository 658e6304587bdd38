//! Trolley CLI

use std::{io, process::ExitCode};

use crate::cli::Cli;

mod cli;
mod config;
mod observability;

fn main() -> ExitCode {
    // Load configuration from .env and CLI arguments
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(parse_error) => {
            _ = parse_error.print();

            return if parse_error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(init_error) = observability::init(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("{init_error}");
        }

        return ExitCode::FAILURE;
    }

    let mut out = io::stdout().lock();

    match cli.run(&mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(run_error) => {
            #[expect(clippy::print_stderr, reason = "errors are reported to the shopper")]
            {
                eprintln!("error: {run_error}");
            }

            ExitCode::FAILURE
        }
    }
}

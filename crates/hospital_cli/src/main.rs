//! Hospital records command-line entry point.
//!
//! # Responsibility
//! - Load the data file, run one command, save when the command mutated.
//! - Map failures to exit codes: 1 for rejected operations, 2 for startup.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use hospital_core::{default_log_level, init_logging, HospitalStore};
use log::error;
use std::process::ExitCode;

const EXIT_DOMAIN_ERROR: u8 = 1;
const EXIT_STARTUP_FAILURE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("error: {err}");
            return ExitCode::from(EXIT_STARTUP_FAILURE);
        }
    }

    let mut store = match HospitalStore::open_or_create(&cli.data) {
        Ok(store) => store,
        Err(err) => {
            error!("event=cli_start module=cli status=error error_code={}", err.code());
            eprintln!("error: cannot open {}: {err}", cli.data.display());
            return ExitCode::from(EXIT_STARTUP_FAILURE);
        }
    };

    let outcome = match commands::execute(&cli.command, &mut store) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(EXIT_DOMAIN_ERROR);
        }
    };

    if outcome.changed {
        if let Err(err) = store.save_to_file(&cli.data) {
            eprintln!("error: {err}");
            return ExitCode::from(EXIT_DOMAIN_ERROR);
        }
    }

    print!("{}", outcome.output);
    ExitCode::SUCCESS
}

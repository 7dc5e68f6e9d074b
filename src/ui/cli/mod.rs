// Wed Feb 04 2026 - Alex

pub mod args;
pub mod handler;

pub use args::{Args, CheckArgs, Command, ListArgs, ListMode, RunArgs};
pub use handler::{report_error, CommandHandler, Status};

use clap::Parser;
use std::process::ExitCode;

pub fn parse_args() -> Args {
    Args::parse()
}

/// Parses the command line, runs it and maps the result to a process exit
/// code. Configuration errors exit with 1.
pub fn run() -> ExitCode {
    let args = parse_args();
    let mut handler = CommandHandler::new();

    match handler.execute(args) {
        Ok(status) => ExitCode::from(status.code()),
        Err(err) => {
            report_error(&err);
            ExitCode::from(1)
        }
    }
}

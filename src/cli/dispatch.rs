//! Command dispatch logic extracted from the binary.

use super::args::{Cli, Commands};
use super::handlers::{handle_scan, handle_status, Context};
use crate::exit::SweepExit;
use crate::profile::ScannerKind;
use anyhow::Result;

/// Executes the parsed command.
///
/// # Errors
/// Returns error if the command handler fails.
pub fn execute(cli: Cli) -> Result<SweepExit> {
    let ctx = Context::from_cli(&cli);
    match cli.command {
        Some(Commands::Optimize) => handle_scan(ScannerKind::Optimize, &ctx),
        Some(Commands::Testgaps) => handle_scan(ScannerKind::TestGaps, &ctx),
        Some(Commands::Status { scanner }) => handle_status(scanner, &ctx),
        None => {
            use clap::CommandFactory;
            let _ = Cli::command().print_help();
            Ok(SweepExit::Success)
        }
    }
}

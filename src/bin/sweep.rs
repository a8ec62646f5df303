use clap::Parser;
use sweep_core::cli::{self, Cli};
use sweep_core::exit::SweepExit;
use sweep_core::logging;

fn main() -> SweepExit {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    cli::dispatch::execute(cli).into()
}

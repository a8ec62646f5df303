use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::profile::ScannerKind;

#[derive(Parser)]
#[command(
    name = "sweep",
    version,
    about = "Incremental heuristic scanners, one unit per run"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Project root the unit directories are relative to [default: .]
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,
    /// Config file [default: <root>/sweep.toml]
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Analyze the next unit for clone, allocation, query and async hot spots
    Optimize,
    /// Analyze the next unit for test coverage gaps
    Testgaps,
    /// Show rotation progress without scanning anything
    Status {
        #[arg(value_enum)]
        scanner: Option<ScannerKind>,
    },
}

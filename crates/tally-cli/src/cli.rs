use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Run action/job scenarios against an in-process coordinator",
    version
)]
pub struct Cli {
    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the built-in fruit scenario
    Demo {
        #[command(flatten)]
        run: RunArgs,

        /// Lower bound of the simulated call delay
        #[arg(long, default_value_t = 500)]
        min_delay_ms: u64,

        /// Upper bound of the simulated call delay
        #[arg(long, default_value_t = 1500)]
        max_delay_ms: u64,
    },

    /// Run a scenario file
    Run {
        /// Path to a scenario JSON file
        scenario: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Seed for simulated delays (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Give up after this long and report what is still pending
    #[arg(long, default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Include every coordinator event in the report
    #[arg(long)]
    pub events: bool,
}

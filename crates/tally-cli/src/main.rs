//! tally CLI: runs scenarios against an in-process coordinator.

mod cli;
mod runner;
mod scenario;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, RunArgs};
use runner::{RunOptions, RunReport};
use scenario::Scenario;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (scenario, args) = match cli.command {
        Commands::Demo {
            run,
            min_delay_ms,
            max_delay_ms,
        } => (Scenario::fruit(min_delay_ms, max_delay_ms), run),
        Commands::Run { scenario, run } => (Scenario::load(&scenario)?, run),
    };

    let report = runner::run(&scenario, options(&args)).await?;
    print_report(&report, args.json)?;

    if !report.completed {
        anyhow::bail!("scenario did not complete");
    }
    Ok(())
}

fn options(args: &RunArgs) -> RunOptions {
    RunOptions {
        seed: args.seed.unwrap_or_else(rand::random),
        timeout: Duration::from_millis(args.timeout_ms),
        record_events: args.events,
    }
}

fn print_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "{} in {}ms (seed {})",
        if report.completed { "completed" } else { "incomplete" },
        report.elapsed_ms,
        report.seed
    );
    println!("satisfied: {}", report.satisfied.join(", "));
    for job in &report.pending_jobs {
        let waiting: Vec<&str> = job.waiting_on.iter().map(|n| n.as_str()).collect();
        println!("pending {}: waiting on {}", job.job_id, waiting.join(", "));
    }
    for failure in &report.failures {
        println!("failure: {failure}");
    }
    for event in &report.events {
        println!("event {}: {}", event.kind(), serde_json::to_string(event)?);
    }
    Ok(())
}

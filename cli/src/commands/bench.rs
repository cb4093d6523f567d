//! Repeated scan trials with a CSV report

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rand::rngs::OsRng;
use stealth::StealthConfig;
use tracing::info;

use crate::config::with_pool_size;
use crate::harness::{run_trial, GenuinePlacement};
use crate::report::ExperimentReport;

pub struct BenchOptions {
    pub runs: usize,
    pub pool_size: Option<usize>,
    pub out_dir: PathBuf,
}

pub fn run(config: &StealthConfig, options: BenchOptions) -> Result<()> {
    if options.runs == 0 {
        bail!("--runs must be at least 1");
    }

    let config = &with_pool_size(config, options.pool_size)?;
    let pool_size = config.pool_size;
    let scanner = config.scanner().context("Failed to build scanner")?;
    // decoys plus the genuine key
    let mut report = ExperimentReport::new(pool_size, pool_size + 1);

    println!(
        "{}",
        format!(
            "Running {} trials over {} decoys with variant {}...",
            options.runs, pool_size, config.variant
        )
        .cyan()
    );

    for run in 1..=options.runs {
        let trial = run_trial(&scanner, pool_size, GenuinePlacement::Random, &mut OsRng)?;
        if !trial.found_genuine() {
            bail!("Trial {} did not find the genuine payment", run);
        }

        info!(
            run,
            elapsed_ms = trial.elapsed.as_millis() as u64,
            examined = trial.outcome.stats.examined,
            "trial finished"
        );
        println!(
            "  Run {:>3}: {:>10.2} ms  (examined {}, full derivations {})",
            run,
            trial.elapsed.as_secs_f64() * 1000.0,
            trial.outcome.stats.examined,
            trial.outcome.stats.full_derivations
        );
        report.record(trial.elapsed);
    }

    let path = report.write_to_dir(&options.out_dir)?;

    println!();
    println!("{} {:.2} ms", "Average:".yellow().bold(), report.average_millis());
    println!("{} {}", "Experiment results saved to".green(), path.display());

    Ok(())
}

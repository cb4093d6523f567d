//! One scan trial over a decoy pool

use anyhow::{Context, Result};
use colored::Colorize;
use rand::rngs::OsRng;
use stealth::StealthConfig;

use crate::config::with_pool_size;
use crate::harness::{run_trial, GenuinePlacement};

pub struct ScanOptions {
    pub pool_size: Option<usize>,
    pub position: Option<usize>,
    pub omit_genuine: bool,
}

pub fn run(config: &StealthConfig, options: ScanOptions) -> Result<()> {
    let config = &with_pool_size(config, options.pool_size)?;
    let pool_size = config.pool_size;
    let placement = GenuinePlacement::from_options(options.position, options.omit_genuine);
    let scanner = config.scanner().context("Failed to build scanner")?;

    println!(
        "{}",
        format!(
            "Scanning {} decoys with variant {} ({} worker(s), view tag {})...",
            pool_size,
            config.variant,
            config.scan.workers,
            if config.scan.use_view_tag { "on" } else { "off" }
        )
        .cyan()
    );

    let trial = run_trial(&scanner, pool_size, placement, &mut OsRng)?;
    let stats = trial.outcome.stats;

    println!();
    match (trial.outcome.found, trial.genuine_index) {
        (Some(found), _) if trial.found_genuine() => {
            println!("{} at index {}", "Payment found".green().bold(), found.index);
        }
        (Some(found), _) => {
            println!("{} at index {}", "Unexpected match".red().bold(), found.index);
        }
        (None, _) if trial.outcome.budget_exhausted => {
            println!("{}", "Scan budget exhausted before a match".yellow());
        }
        (None, Some(expected)) => {
            println!(
                "{} (genuine key was at index {})",
                "Payment NOT found".red().bold(),
                expected
            );
        }
        (None, None) => {
            println!("{}", "No payment found (genuine key omitted)".green());
        }
    }

    println!();
    println!("{}", "Cost".yellow().bold());
    println!("  Candidates:       {}", trial.candidates);
    println!("  Examined:         {}", stats.examined);
    println!("  Tag matches:      {}", stats.tag_matches);
    println!("  Full derivations: {}", stats.full_derivations);
    println!("  Skipped:          {}", stats.skipped);
    println!("  Duration:         {:.2} ms", trial.elapsed.as_secs_f64() * 1000.0);

    Ok(())
}

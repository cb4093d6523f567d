//! pairsap CLI - generate, derive and scan pairing-based stealth addresses

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod harness;
mod report;


use commands::*;

#[derive(Parser)]
#[command(name = "pairsap")]
#[command(version = "0.1.0")]
#[command(about = "Pairing-based stealth addresses with view tags over BN254")]
#[command(long_about = r#"
pairsap derives one-time stealth addresses from a receiver's spend and view
keys using the BN254 pairing, and measures how fast a receiver can find its
payment among a pool of unrelated ephemeral keys.

Variants:
  a   hashed pairing: 20-byte hash of e(K, V)^r
  b   additive pairing: K + H(e(G, r*V))*G
  c   raw pairing: the GT element itself (measurement baseline only)

Quick Start:
  1. pairsap keygen              Generate receiver keys
  2. pairsap derive              Post and recover one payment
  3. pairsap scan --pool-size 5000
  4. pairsap bench --runs 10     Write an experiment CSV
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Flags that override values from the config file
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Scheme variant: a, b or c
    #[arg(long, global = true)]
    pub variant: Option<String>,

    /// Group holding the spend key: spend-g1 or spend-g2
    #[arg(long, global = true)]
    pub roles: Option<String>,

    /// Scan worker threads (1 scans on the main thread)
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// Derive every candidate instead of filtering by view tag
    #[arg(long, global = true)]
    pub no_view_tag: bool,

    /// Log scan progress at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate receiver spend and view keys
    Keygen {
        /// Also print the secret scalars
        #[arg(long)]
        reveal_secrets: bool,
    },

    /// Derive one stealth address as sender and recover it as receiver
    Derive,

    /// Run one scan over a pool of decoy ephemeral keys
    Scan {
        /// Number of decoys (defaults to the configured pool size)
        #[arg(long)]
        pool_size: Option<usize>,

        /// Index of the genuine key in the pool (random when omitted)
        #[arg(long)]
        position: Option<usize>,

        /// Leave the genuine key out of the pool
        #[arg(long, conflicts_with = "position")]
        omit_genuine: bool,
    },

    /// Repeat scan trials and write a CSV report
    Bench {
        /// Number of trials
        #[arg(long, default_value_t = report::DEFAULT_RUNS)]
        runs: usize,

        /// Number of decoys (defaults to the configured pool size)
        #[arg(long)]
        pool_size: Option<usize>,

        /// Directory for the CSV report
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Show the effective configuration
    Info {
        /// Write the effective configuration to the config path
        #[arg(long)]
        save: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let settings = config::resolve(&cli.global)?;

    match cli.command {
        Commands::Keygen { reveal_secrets } => {
            keygen::run(&settings, reveal_secrets)?;
        }
        Commands::Derive => {
            derive::run(&settings)?;
        }
        Commands::Scan { pool_size, position, omit_genuine } => {
            scan::run(&settings, scan::ScanOptions { pool_size, position, omit_genuine })?;
        }
        Commands::Bench { runs, pool_size, out_dir } => {
            bench::run(&settings, bench::BenchOptions { runs, pool_size, out_dir })?;
        }
        Commands::Info { save } => {
            info::run(&settings, cli.global.config.as_deref(), save)?;
        }
    }

    Ok(())
}

//! Show the effective configuration

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use stealth::{SchemeVariant, StealthConfig};

use crate::config::{default_config_path, save_config};

pub fn run(config: &StealthConfig, explicit_path: Option<&Path>, save: bool) -> Result<()> {
    println!();
    println!("{}", "pairsap Configuration".yellow().bold());
    println!();

    let path = explicit_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    println!("{}:", "Config File".cyan());
    match &path {
        Some(p) if p.exists() => println!("  {}", p.display()),
        Some(p) => println!("  {} {}", p.display(), "(not present, using defaults)".dimmed()),
        None => println!("  {}", "no config directory on this platform".dimmed()),
    }
    println!();

    println!("{}:", "Effective Settings".cyan());
    for line in config.to_json()?.lines() {
        println!("  {}", line);
    }
    println!();

    println!("{}:", "Variants".cyan());
    for variant in SchemeVariant::ALL {
        let marker = if variant == config.variant { "*" } else { " " };
        let note = if variant.is_baseline_only() { " (baseline only)" } else { "" };
        println!("  {} {}{}", marker, variant, note.dimmed());
    }
    println!();

    if save {
        let target = path.context("No config path available; pass --config")?;
        save_config(config, &target)?;
        println!("{} {}", "Saved configuration to".green(), target.display());
    }

    Ok(())
}

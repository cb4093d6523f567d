//! Receiver key generation

use anyhow::{Context, Result};
use colored::Colorize;
use rand::rngs::OsRng;
use stealth::{Bn254Engine, KeyPair, ReceiverKeys, StealthConfig};

pub fn run(config: &StealthConfig, reveal_secrets: bool) -> Result<()> {
    println!("{}", "=== Stealth Key Generation ===".cyan().bold());
    println!();

    let engine = Bn254Engine::new();
    let keys = ReceiverKeys::generate(config.roles, &engine, &mut OsRng)
        .context("Failed to generate receiver keys")?;

    println!("{} {}", "Role assignment:".cyan(), config.roles);
    println!();
    print_key("Spend", keys.spend())?;
    print_key("View", keys.view())?;

    println!("{}", "Meta-address (share this with senders):".yellow().bold());
    println!("  {}", keys.meta_address().encode()?);
    println!();

    if reveal_secrets {
        println!(
            "{}",
            "WARNING: anyone holding these secrets can find and spend your payments".red().bold()
        );
        println!("  Spend secret: {}", hex::encode(keys.spend().secret().to_bytes()));
        println!("  View secret:  {}", hex::encode(keys.view().secret().to_bytes()));
        println!();
    }

    Ok(())
}

fn print_key(label: &str, key: &KeyPair) -> Result<()> {
    println!("{} ({}):", format!("{} public key", label).cyan(), key.group());
    println!("  {}", key.public().to_hex()?);
    println!();
    Ok(())
}

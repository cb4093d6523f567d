//! Derive one stealth address as the sender and recover it as the receiver

use anyhow::{Context, Result};
use colored::Colorize;
use rand::rngs::OsRng;
use stealth::{derive_public, generate_ephemeral, ReceiverKeys, SchemeVariant, StealthAddress, StealthConfig};

pub fn run(config: &StealthConfig) -> Result<()> {
    let deriver = config.deriver();
    let engine = deriver.engine();
    let roles = deriver.roles();

    println!("{} {}", "Variant:".cyan(), deriver.variant());
    if deriver.variant().is_baseline_only() {
        println!(
            "{}",
            "Warning: variant C posts the raw pairing output and is a measurement baseline only".yellow()
        );
    }
    println!("{} {}", "Roles:".cyan(), roles);
    println!();

    let receiver =
        ReceiverKeys::generate(roles, engine, &mut OsRng).context("Failed to generate receiver keys")?;
    let ephemeral =
        generate_ephemeral(roles, engine, &mut OsRng).context("Failed to generate ephemeral key")?;
    let meta = receiver.meta_address();

    // Sender side
    let address = deriver
        .sender_address(ephemeral.secret(), &meta.spend_public, &meta.view_public)
        .context("Sender failed to derive the address")?;
    let tag = deriver
        .view_tags()
        .sender_tag(ephemeral.secret(), &meta.view_public)
        .context("Sender failed to derive the view tag")?;

    println!("{}", "Posted payment".yellow().bold());
    println!("  Ephemeral key: {}", ephemeral.public().to_hex()?);
    println!("  Address:       {}", address);
    println!("  View tag:      {}", tag);
    println!();

    // Receiver side
    let seen_tag = deriver
        .view_tags()
        .receiver_tag(ephemeral.public(), receiver.view().secret())
        .context("Receiver failed to derive the view tag")?;
    let recovered = deriver
        .receiver_address(ephemeral.public(), &meta.spend_public, receiver.view().secret())
        .context("Receiver failed to derive the address")?;

    println!("{}", "Receiver".yellow().bold());
    print_check("View tag matches", seen_tag == tag);
    print_check("Address matches", recovered.matches(&address));

    if deriver.variant() == SchemeVariant::AdditivePairing {
        let spending = deriver
            .derive_spending_key(ephemeral.public(), receiver.spend().secret(), receiver.view().secret())
            .context("Failed to derive the spending key")?;
        let controlled = derive_public(engine, &spending, roles.spend_group())?;
        print_check(
            "Spending key controls the address",
            address.matches(&StealthAddress::Point(controlled)),
        );
    }

    Ok(())
}

fn print_check(label: &str, ok: bool) {
    if ok {
        println!("  {}: {}", label, "yes".green());
    } else {
        println!("  {}: {}", label, "NO".red().bold());
    }
}

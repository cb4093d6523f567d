//! Scan trials shared by the `scan` and `bench` commands
//!
//! A trial generates a fresh receiver and ephemeral key, posts one payment,
//! hides the ephemeral key in a pool of decoys and times the receiver's scan.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use rand::{CryptoRng, Rng, RngCore};
use stealth::{
    generate_decoys, generate_ephemeral, PostedPayment, ReceiverKeys, ScanOutcome, Scanner,
};

/// Where the genuine ephemeral key goes in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenuinePlacement {
    At(usize),
    Random,
    Omitted,
}

impl GenuinePlacement {
    pub fn from_options(position: Option<usize>, omit_genuine: bool) -> Self {
        match (position, omit_genuine) {
            (_, true) => GenuinePlacement::Omitted,
            (Some(index), false) => GenuinePlacement::At(index),
            (None, false) => GenuinePlacement::Random,
        }
    }
}

#[derive(Debug)]
pub struct TrialResult {
    pub outcome: ScanOutcome,
    /// Scan time only; key and pool generation are excluded
    pub elapsed: Duration,
    pub genuine_index: Option<usize>,
    pub candidates: usize,
}

impl TrialResult {
    pub fn found_genuine(&self) -> bool {
        matches!(
            (self.outcome.found, self.genuine_index),
            (Some(found), Some(expected)) if found.index == expected
        )
    }
}

pub fn run_trial<R: RngCore + CryptoRng>(
    scanner: &Scanner,
    pool_size: usize,
    placement: GenuinePlacement,
    rng: &mut R,
) -> Result<TrialResult> {
    let deriver = scanner.deriver();
    let engine = deriver.engine();
    let roles = deriver.roles();

    if let GenuinePlacement::At(index) = placement {
        if index > pool_size {
            bail!("Position {} is outside a pool of {} decoys", index, pool_size);
        }
    }

    let receiver =
        ReceiverKeys::generate(roles, engine, rng).context("Failed to generate receiver keys")?;
    let ephemeral =
        generate_ephemeral(roles, engine, rng).context("Failed to generate ephemeral key")?;
    let meta = receiver.meta_address();

    let posted = PostedPayment {
        address: deriver
            .sender_address(ephemeral.secret(), &meta.spend_public, &meta.view_public)
            .context("Failed to derive stealth address")?,
        view_tag: deriver
            .view_tags()
            .sender_tag(ephemeral.secret(), &meta.view_public)
            .context("Failed to derive view tag")?,
    };

    let mut pool = generate_decoys(pool_size, roles.ephemeral_group(), engine, rng)
        .context("Failed to generate decoy pool")?;

    let genuine_index = match placement {
        GenuinePlacement::At(index) => Some(index),
        GenuinePlacement::Random => Some(rng.gen_range(0..=pool_size)),
        GenuinePlacement::Omitted => None,
    };
    if let Some(index) = genuine_index {
        pool.insert(index, *ephemeral.public());
    }

    let started = Instant::now();
    let outcome = scanner
        .scan(&pool, &posted, receiver.view().secret(), &meta.spend_public)
        .context("Scan failed")?;
    let elapsed = started.elapsed();

    Ok(TrialResult {
        outcome,
        elapsed,
        genuine_index,
        candidates: pool.len(),
    })
}

//! Receiver-side scanning over candidate ephemeral keys
//!
//! The scan is linear. For every candidate the view tag is checked first and
//! only tag matches pay for the full derivation. With more than one worker the
//! candidates are split over a dedicated rayon pool; the lowest matching index
//! always wins, so parallel and sequential scans report the same match.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::address::StealthAddress;
use crate::deriver::StealthAddressDeriver;
use crate::engine::{Bn254Engine, PairingEngine};
use crate::error::{Result, StealthError};
use crate::group::GroupElement;
use crate::keys::KeyRole;
use crate::scalar::SecretScalar;
use crate::view_tag::ViewTag;

/// What the sender publishes next to the ephemeral public key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostedPayment {
    pub address: StealthAddress,
    pub view_tag: ViewTag,
}

/// Limits on a single scan; `None` means unlimited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanBudget {
    pub max_candidates: Option<usize>,
    pub max_millis: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Reject candidates by view tag before deriving the full address
    pub use_view_tag: bool,
    /// 1 scans on the calling thread
    pub workers: usize,
    pub budget: ScanBudget,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            use_view_tag: true,
            workers: 1,
            budget: ScanBudget::default(),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(StealthError::InvalidConfig(
                "scan.workers must be at least 1".to_string(),
            ));
        }
        if self.budget.max_millis == Some(0) {
            return Err(StealthError::InvalidConfig(
                "scan.budget.max_millis must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// The candidate whose derived address equals the posted one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMatch {
    /// Position of the matching candidate in the scanned slice
    pub index: usize,
    pub candidate: GroupElement,
}

/// Cost counters for one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub examined: usize,
    pub tag_matches: usize,
    pub full_derivations: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub found: Option<ScanMatch>,
    pub stats: ScanStats,
    /// The budget ran out before the scan could finish
    pub budget_exhausted: bool,
}

#[derive(Default)]
struct ScanCounters {
    examined: AtomicUsize,
    tag_matches: AtomicUsize,
    full_derivations: AtomicUsize,
    skipped: AtomicUsize,
}

impl ScanCounters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ScanStats {
        ScanStats {
            examined: self.examined.load(Ordering::Relaxed),
            tag_matches: self.tag_matches.load(Ordering::Relaxed),
            full_derivations: self.full_derivations.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Per-scan state shared by all workers
struct ScanContext<'a> {
    target: &'a PostedPayment,
    view_secret: &'a SecretScalar,
    spend_public: &'a GroupElement,
    deadline: Option<Instant>,
    cancel: AtomicBool,
    counters: ScanCounters,
}

/// Finds the ephemeral key behind a posted payment in a pool of candidates
///
/// Owns a rayon pool when configured with more than one worker. The budget in
/// `ScanConfig` is applied to every scan.
pub struct Scanner<E = Bn254Engine> {
    deriver: StealthAddressDeriver<E>,
    config: ScanConfig,
    pool: Option<ThreadPool>,
}

impl<E: PairingEngine> Scanner<E> {
    pub fn new(deriver: StealthAddressDeriver<E>, config: ScanConfig) -> Result<Self> {
        config.validate()?;

        let pool = if config.workers > 1 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(config.workers)
                .thread_name(|i| format!("scan-worker-{}", i))
                .build()
                .map_err(|e| StealthError::WorkerPool(e.to_string()))?;
            Some(pool)
        } else {
            None
        };

        Ok(Self { deriver, config, pool })
    }

    pub fn deriver(&self) -> &StealthAddressDeriver<E> {
        &self.deriver
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Find the candidate ephemeral key that produced `target`
    pub fn scan(
        &self,
        candidates: &[GroupElement],
        target: &PostedPayment,
        view_secret: &SecretScalar,
        spend_public: &GroupElement,
    ) -> Result<ScanOutcome> {
        if candidates.is_empty() {
            return Ok(ScanOutcome::default());
        }

        self.deriver.ensure_address_kind(&target.address)?;
        self.deriver.check_key(spend_public, KeyRole::Spend)?;

        let limit = self
            .config
            .budget
            .max_candidates
            .map_or(candidates.len(), |max| max.min(candidates.len()));
        let window = &candidates[..limit];

        let started = Instant::now();
        let ctx = ScanContext {
            target,
            view_secret,
            spend_public,
            deadline: self
                .config
                .budget
                .max_millis
                .map(|ms| started + Duration::from_millis(ms)),
            cancel: AtomicBool::new(false),
            counters: ScanCounters::default(),
        };

        debug!(
            candidates = candidates.len(),
            window = window.len(),
            variant = %self.deriver.variant(),
            workers = self.config.workers,
            view_tag = self.config.use_view_tag,
            "starting scan"
        );

        let found = match &self.pool {
            Some(pool) => pool.install(|| {
                window
                    .par_iter()
                    .enumerate()
                    .find_map_first(|(index, candidate)| self.visit(index, candidate, &ctx))
            }),
            None => window
                .iter()
                .enumerate()
                .find_map(|(index, candidate)| self.visit(index, candidate, &ctx)),
        };

        let budget_exhausted =
            found.is_none() && (limit < candidates.len() || ctx.cancel.load(Ordering::Relaxed));
        let stats = ctx.counters.snapshot();

        debug!(
            found = found.map(|m| m.index),
            examined = stats.examined,
            tag_matches = stats.tag_matches,
            full_derivations = stats.full_derivations,
            skipped = stats.skipped,
            budget_exhausted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan finished"
        );

        Ok(ScanOutcome {
            found,
            stats,
            budget_exhausted,
        })
    }

    fn visit(&self, index: usize, candidate: &GroupElement, ctx: &ScanContext<'_>) -> Option<ScanMatch> {
        if ctx.cancel.load(Ordering::Relaxed) {
            return None;
        }
        if let Some(deadline) = ctx.deadline {
            if Instant::now() >= deadline {
                ctx.cancel.store(true, Ordering::Relaxed);
                return None;
            }
        }

        ScanCounters::bump(&ctx.counters.examined);
        match self.check_candidate(candidate, ctx) {
            Ok(true) => Some(ScanMatch {
                index,
                candidate: *candidate,
            }),
            Ok(false) => None,
            Err(err) => {
                warn!(index, error = %err, "skipping scan candidate");
                ScanCounters::bump(&ctx.counters.skipped);
                None
            }
        }
    }

    fn check_candidate(&self, candidate: &GroupElement, ctx: &ScanContext<'_>) -> Result<bool> {
        let derived = if self.config.use_view_tag {
            let check = self.deriver.view_tags().tag_candidate(candidate, ctx.view_secret)?;
            if check.tag != ctx.target.view_tag {
                return Ok(false);
            }
            ScanCounters::bump(&ctx.counters.tag_matches);
            self.deriver
                .receiver_address_from_tag_check(&check, candidate, ctx.spend_public, ctx.view_secret)?
        } else {
            self.deriver
                .receiver_address(candidate, ctx.spend_public, ctx.view_secret)?
        };

        ScanCounters::bump(&ctx.counters.full_derivations);
        Ok(derived.matches(&ctx.target.address))
    }
}

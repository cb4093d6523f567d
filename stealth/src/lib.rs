//! Pairing-based stealth addresses over BN254
//!
//! A receiver publishes a meta-address (spend public key K, view public key V).
//! A sender picks an ephemeral key r, posts R = r·G next to a one-time address
//! and a one-byte view tag, and only the holder of the view secret can link the
//! payment back to the receiver.
//!
//! Three derivation schemes are provided (see [`deriver`]):
//! - **A** `HashedPairing`: 20-byte hash of `e(K, V)^r`
//! - **B** `AdditivePairing`: `K + H(e(G, r·V))·G`, spendable with `k + H(..)`
//! - **C** `RawPairing`: the GT element itself, a measurement baseline only
//!
//! The [`scanner`] walks candidate ephemeral keys, rejects most of them by
//! view tag and runs the full derivation on the rest.
//!
//! ```no_run
//! use rand::rngs::OsRng;
//! use stealth::{
//!     generate_ephemeral, Bn254Engine, PostedPayment, ReceiverKeys, RoleAssignment,
//!     ScanConfig, Scanner, SchemeVariant, StealthAddressDeriver,
//! };
//!
//! # fn main() -> stealth::Result<()> {
//! let engine = Bn254Engine::new();
//! let roles = RoleAssignment::default();
//! let deriver = StealthAddressDeriver::new(engine, SchemeVariant::HashedPairing, roles);
//!
//! let receiver = ReceiverKeys::generate(roles, &engine, &mut OsRng)?;
//! let ephemeral = generate_ephemeral(roles, &engine, &mut OsRng)?;
//! let meta = receiver.meta_address();
//!
//! let posted = PostedPayment {
//!     address: deriver.sender_address(ephemeral.secret(), &meta.spend_public, &meta.view_public)?,
//!     view_tag: deriver.view_tags().sender_tag(ephemeral.secret(), &meta.view_public)?,
//! };
//!
//! let scanner = Scanner::new(deriver, ScanConfig::default())?;
//! let outcome = scanner.scan(&[*ephemeral.public()], &posted, receiver.view().secret(), &meta.spend_public)?;
//! assert!(outcome.found.is_some());
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod config;
pub mod deriver;
pub mod engine;
pub mod error;
pub mod group;
pub mod keys;
pub mod scalar;
pub mod scanner;
pub mod view_tag;


#[cfg(test)]
mod integration_tests;


pub use address::{StealthAddress, ADDRESS_DOMAIN, ADDRESS_LEN};
pub use config::{StealthConfig, DEFAULT_POOL_SIZE, MAX_POOL_SIZE};
pub use deriver::{SchemeVariant, StealthAddressDeriver, SHARED_SECRET_DST};
pub use engine::{Bn254Engine, PairingEngine};
pub use error::{Result, StealthError};
pub use group::{GroupElement, GroupId, GtElement};
pub use keys::{
    derive_public, generate_decoys, generate_ephemeral, KeyPair, KeyRole, MetaAddress,
    ReceiverKeys, RoleAssignment,
};
pub use scalar::{SecretScalar, SCALAR_BYTES};
pub use scanner::{PostedPayment, ScanBudget, ScanConfig, ScanMatch, ScanOutcome, ScanStats, Scanner};
pub use view_tag::{ViewTag, ViewTagFilter, VIEW_TAG_DOMAIN};

/// Scalar field of BN254, for callers implementing [`PairingEngine`]
pub use ark_bn254::Fr;

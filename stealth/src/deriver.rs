//! Stealth address derivation for the three pairing schemes
//!
//! Notation: X is the spend group, Y the view/ephemeral group.
//! K = k·G_X, V = v·G_Y, R = r·G_Y.
//!
//! ## Variant A: hashed pairing
//! Sender: `shared = e(K, V)^r`. Receiver: `shared = e(K, R)^v`.
//! Address: `SHA-256(ADDRESS_DOMAIN || shared)[..20]`.
//!
//! ## Variant B: additive pairing
//! Sender: `dh = r·V`. Receiver: `dh = v·R`.
//! `shared = e(G_X, dh)`, `s = H(shared)`, address `K + s·G_X`.
//! The receiver can spend from the address with the key `k + s`.
//!
//! ## Variant C: raw pairing
//! Same shared value as A, posted without hashing. This exposes the GT element
//! to every observer and exists only as a measurement baseline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::StealthAddress;
use crate::engine::{Bn254Engine, PairingEngine};
use crate::error::{Result, StealthError};
use crate::group::{GroupElement, GtElement};
use crate::keys::{KeyRole, RoleAssignment};
use crate::scalar::SecretScalar;
use crate::view_tag::{TagCheck, ViewTagFilter};

/// Domain separator for hashing the shared pairing output into a scalar
pub const SHARED_SECRET_DST: &[u8] = b"pairsap_shared_secret_v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchemeVariant {
    /// A: 20-byte hash of the shared GT element
    #[default]
    #[serde(rename = "a", alias = "hashed-pairing")]
    HashedPairing,
    /// B: spend key offset by a hashed shared secret
    #[serde(rename = "b", alias = "additive-pairing")]
    AdditivePairing,
    /// C: the shared GT element itself
    #[serde(rename = "c", alias = "raw-pairing")]
    RawPairing,
}

impl SchemeVariant {
    pub const ALL: [SchemeVariant; 3] = [
        SchemeVariant::HashedPairing,
        SchemeVariant::AdditivePairing,
        SchemeVariant::RawPairing,
    ];

    /// Whether the view tag is computed from the pairing output instead of
    /// the Diffie-Hellman point
    pub fn tag_uses_pairing(self) -> bool {
        matches!(self, SchemeVariant::AdditivePairing)
    }

    /// Variant C leaks the shared GT element and is not meant for real use
    pub fn is_baseline_only(self) -> bool {
        matches!(self, SchemeVariant::RawPairing)
    }
}

impl fmt::Display for SchemeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeVariant::HashedPairing => write!(f, "A (hashed pairing)"),
            SchemeVariant::AdditivePairing => write!(f, "B (additive pairing)"),
            SchemeVariant::RawPairing => write!(f, "C (raw pairing)"),
        }
    }
}

impl FromStr for SchemeVariant {
    type Err = StealthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "hashed" | "hashed-pairing" => Ok(SchemeVariant::HashedPairing),
            "b" | "additive" | "additive-pairing" => Ok(SchemeVariant::AdditivePairing),
            "c" | "raw" | "raw-pairing" => Ok(SchemeVariant::RawPairing),
            other => Err(StealthError::InvalidConfig(format!(
                "unknown scheme variant '{}', expected a, b or c",
                other
            ))),
        }
    }
}

/// Sender and receiver derivation for one variant and role assignment
#[derive(Debug, Clone)]
pub struct StealthAddressDeriver<E = Bn254Engine> {
    engine: E,
    variant: SchemeVariant,
    roles: RoleAssignment,
}

impl<E: PairingEngine> StealthAddressDeriver<E> {
    pub fn new(engine: E, variant: SchemeVariant, roles: RoleAssignment) -> Self {
        Self { engine, variant, roles }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn variant(&self) -> SchemeVariant {
        self.variant
    }

    pub fn roles(&self) -> RoleAssignment {
        self.roles
    }

    /// View tag computation bound to this deriver's variant and roles
    pub fn view_tags(&self) -> ViewTagFilter<'_, E> {
        ViewTagFilter::new(self)
    }

    /// Sender side: the address a payment to (K, V) is posted under
    pub fn sender_address(
        &self,
        ephemeral_secret: &SecretScalar,
        spend_public: &GroupElement,
        view_public: &GroupElement,
    ) -> Result<StealthAddress> {
        self.check_key(spend_public, KeyRole::Spend)?;
        self.check_key(view_public, KeyRole::View)?;

        match self.variant {
            SchemeVariant::HashedPairing | SchemeVariant::RawPairing => {
                let base = self.engine.pair(spend_public, view_public)?;
                let shared = self.engine.gt_exp(&base, ephemeral_secret.as_field())?;
                self.pairing_address(&shared)
            }
            SchemeVariant::AdditivePairing => {
                let dh = self.engine.scalar_mul(ephemeral_secret.as_field(), view_public)?;
                let shared = self.dh_pairing(&dh)?;
                self.additive_address(&shared, spend_public)
            }
        }
    }

    /// Receiver side: the address a candidate ephemeral key maps to
    pub fn receiver_address(
        &self,
        ephemeral_public: &GroupElement,
        spend_public: &GroupElement,
        view_secret: &SecretScalar,
    ) -> Result<StealthAddress> {
        self.check_key(ephemeral_public, KeyRole::Ephemeral)?;
        self.check_key(spend_public, KeyRole::Spend)?;

        match self.variant {
            SchemeVariant::HashedPairing | SchemeVariant::RawPairing => {
                let base = self.engine.pair(spend_public, ephemeral_public)?;
                let shared = self.engine.gt_exp(&base, view_secret.as_field())?;
                self.pairing_address(&shared)
            }
            SchemeVariant::AdditivePairing => {
                let dh = self.engine.scalar_mul(view_secret.as_field(), ephemeral_public)?;
                let shared = self.dh_pairing(&dh)?;
                self.additive_address(&shared, spend_public)
            }
        }
    }

    /// Receiver side, reusing the pairing output of a view tag check when the
    /// variant allows it
    pub(crate) fn receiver_address_from_tag_check(
        &self,
        check: &TagCheck,
        ephemeral_public: &GroupElement,
        spend_public: &GroupElement,
        view_secret: &SecretScalar,
    ) -> Result<StealthAddress> {
        match (self.variant, check.shared.as_ref()) {
            (SchemeVariant::AdditivePairing, Some(shared)) => {
                self.check_key(spend_public, KeyRole::Spend)?;
                self.additive_address(shared, spend_public)
            }
            _ => self.receiver_address(ephemeral_public, spend_public, view_secret),
        }
    }

    /// Recompute the address for `ephemeral_public` and compare it with `target`
    pub fn verify(
        &self,
        target: &StealthAddress,
        ephemeral_public: &GroupElement,
        spend_public: &GroupElement,
        view_secret: &SecretScalar,
    ) -> Result<bool> {
        self.ensure_address_kind(target)?;
        let derived = self.receiver_address(ephemeral_public, spend_public, view_secret)?;
        Ok(derived.matches(target))
    }

    /// Private key controlling a variant B address: `k + H(shared)`
    ///
    /// The other variants post a hash or a GT element, which has no
    /// discrete log for the receiver to know.
    pub fn derive_spending_key(
        &self,
        ephemeral_public: &GroupElement,
        spend_secret: &SecretScalar,
        view_secret: &SecretScalar,
    ) -> Result<SecretScalar> {
        if self.variant != SchemeVariant::AdditivePairing {
            return Err(StealthError::SchemeMismatch(format!(
                "variant {} addresses have no spending key",
                self.variant
            )));
        }
        self.check_key(ephemeral_public, KeyRole::Ephemeral)?;

        let dh = self.engine.scalar_mul(view_secret.as_field(), ephemeral_public)?;
        let shared = self.dh_pairing(&dh)?;
        let offset = self.engine.hash_to_scalar(&shared.to_bytes()?, SHARED_SECRET_DST)?;

        SecretScalar::from_field(*spend_secret.as_field() + offset)
    }

    pub(crate) fn ensure_address_kind(&self, address: &StealthAddress) -> Result<()> {
        if address.variant() != self.variant {
            return Err(StealthError::SchemeMismatch(format!(
                "address of variant {} given to a variant {} deriver",
                address.variant(),
                self.variant
            )));
        }
        Ok(())
    }

    /// Role check for an externally supplied public key
    pub(crate) fn check_key(&self, point: &GroupElement, role: KeyRole) -> Result<()> {
        let expected = self.roles.group_for(role);
        if point.group() != expected {
            return Err(StealthError::InvalidKey(format!(
                "{} key must be in {}, got a {} point",
                role,
                expected,
                point.group()
            )));
        }
        if point.is_identity() {
            return Err(StealthError::InvalidKey(format!("{} key is the identity", role)));
        }
        point.check_subgroup()
    }

    /// `e(G_X, dh)`, the shared value of variant B
    pub(crate) fn dh_pairing(&self, dh: &GroupElement) -> Result<GtElement> {
        let generator = GroupElement::generator(self.roles.spend_group());
        self.engine.pair(&generator, dh)
    }

    fn pairing_address(&self, shared: &GtElement) -> Result<StealthAddress> {
        if self.variant == SchemeVariant::RawPairing {
            Ok(StealthAddress::Raw(*shared))
        } else {
            StealthAddress::hashed_from(shared)
        }
    }

    fn additive_address(&self, shared: &GtElement, spend_public: &GroupElement) -> Result<StealthAddress> {
        let s = self.engine.hash_to_scalar(&shared.to_bytes()?, SHARED_SECRET_DST)?;
        let offset = self.engine.mul_generator(&s, self.roles.spend_group())?;
        let point = self.engine.add(spend_public, &offset)?;

        if point.is_identity() {
            return Err(StealthError::InvalidKey(
                "derived address is the identity".to_string(),
            ));
        }
        Ok(StealthAddress::Point(point))
    }
}

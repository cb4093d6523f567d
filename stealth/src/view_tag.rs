//! One-byte view tags for cheap candidate rejection
//!
//! Variants A and C tag the Diffie-Hellman point `dh = r·V = v·R`, which costs
//! the receiver one scalar multiplication and no pairing. Variant B tags its
//! shared pairing output, so the pairing is paid up front and the scanner
//! reuses it for the full derivation.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::deriver::StealthAddressDeriver;
use crate::engine::PairingEngine;
use crate::error::Result;
use crate::group::{GroupElement, GtElement};
use crate::keys::KeyRole;
use crate::scalar::SecretScalar;

/// Domain separator for view tag hashing
pub const VIEW_TAG_DOMAIN: &[u8] = b"pairsap_view_tag_v1";

/// First byte of the domain-separated SHA-256 of the tag material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewTag(pub u8);

impl fmt::Display for ViewTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Receiver-side tag plus whatever pairing work was done to get it
pub(crate) struct TagCheck {
    pub(crate) tag: ViewTag,
    pub(crate) shared: Option<GtElement>,
}

/// Computes view tags for one deriver's variant and role assignment
pub struct ViewTagFilter<'a, E> {
    deriver: &'a StealthAddressDeriver<E>,
}

impl<'a, E: PairingEngine> ViewTagFilter<'a, E> {
    pub(crate) fn new(deriver: &'a StealthAddressDeriver<E>) -> Self {
        Self { deriver }
    }

    /// Tag published by the sender next to the ephemeral public key
    pub fn sender_tag(&self, ephemeral_secret: &SecretScalar, view_public: &GroupElement) -> Result<ViewTag> {
        self.deriver.check_key(view_public, KeyRole::View)?;
        let dh = self
            .deriver
            .engine()
            .scalar_mul(ephemeral_secret.as_field(), view_public)?;
        Ok(self.tag_from_dh(&dh)?.tag)
    }

    /// Tag the receiver recomputes for a candidate ephemeral key. Equals the
    /// sender's tag for a genuine payment; a decoy matches with probability 1/256.
    pub fn receiver_tag(&self, ephemeral_public: &GroupElement, view_secret: &SecretScalar) -> Result<ViewTag> {
        Ok(self.tag_candidate(ephemeral_public, view_secret)?.tag)
    }

    pub(crate) fn tag_candidate(&self, ephemeral_public: &GroupElement, view_secret: &SecretScalar) -> Result<TagCheck> {
        self.deriver.check_key(ephemeral_public, KeyRole::Ephemeral)?;
        let dh = self
            .deriver
            .engine()
            .scalar_mul(view_secret.as_field(), ephemeral_public)?;
        self.tag_from_dh(&dh)
    }

    fn tag_from_dh(&self, dh: &GroupElement) -> Result<TagCheck> {
        if self.deriver.variant().tag_uses_pairing() {
            let shared = self.deriver.dh_pairing(dh)?;
            Ok(TagCheck {
                tag: hash_tag(&shared.to_bytes()?),
                shared: Some(shared),
            })
        } else {
            Ok(TagCheck {
                tag: hash_tag(&dh.to_bytes()?),
                shared: None,
            })
        }
    }
}

fn hash_tag(material: &[u8]) -> ViewTag {
    let mut hasher = Sha256::new();
    hasher.update(VIEW_TAG_DOMAIN);
    hasher.update(material);
    ViewTag(hasher.finalize()[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deriver::SchemeVariant;
    use crate::engine::Bn254Engine;
    use crate::keys::{generate_ephemeral, ReceiverKeys, RoleAssignment};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sender_and_receiver_tags_agree() {
        let mut rng = StdRng::seed_from_u64(20);
        let engine = Bn254Engine::new();

        for variant in SchemeVariant::ALL {
            for roles in [RoleAssignment::SpendG1ViewG2, RoleAssignment::SpendG2ViewG1] {
                let deriver = StealthAddressDeriver::new(engine, variant, roles);
                let receiver = ReceiverKeys::generate(roles, &engine, &mut rng).unwrap();
                let eph = generate_ephemeral(roles, &engine, &mut rng).unwrap();

                let filter = deriver.view_tags();
                let sent = filter.sender_tag(eph.secret(), receiver.view().public()).unwrap();
                let seen = filter.receiver_tag(eph.public(), receiver.view().secret()).unwrap();
                assert_eq!(sent, seen);
            }
        }
    }

    #[test]
    fn test_tag_check_keeps_pairing_only_for_additive() {
        let mut rng = StdRng::seed_from_u64(21);
        let engine = Bn254Engine::new();
        let roles = RoleAssignment::default();
        let receiver = ReceiverKeys::generate(roles, &engine, &mut rng).unwrap();
        let eph = generate_ephemeral(roles, &engine, &mut rng).unwrap();

        let hashed = StealthAddressDeriver::new(engine, SchemeVariant::HashedPairing, roles);
        let check = hashed.view_tags().tag_candidate(eph.public(), receiver.view().secret()).unwrap();
        assert!(check.shared.is_none());

        let additive = StealthAddressDeriver::new(engine, SchemeVariant::AdditivePairing, roles);
        let check = additive.view_tags().tag_candidate(eph.public(), receiver.view().secret()).unwrap();
        assert!(check.shared.is_some());
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(ViewTag(0x0a).to_string(), "0x0a");
    }
}

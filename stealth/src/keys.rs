//! Key generation and group assignment for the three key roles
//!
//! ## Roles
//! - spend key (k, K = k·G_X): lives in the spend group X
//! - view key (v, V = v·G_Y): lives in the other group Y
//! - ephemeral key (r, R = r·G_Y): generated by the sender per payment, also in Y
//!
//! The receiver publishes the meta-address (K, V). The ephemeral key always
//! sits opposite the spend key because every scheme pairs K against a point
//! derived from R.

use std::fmt;
use std::str::FromStr;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::engine::PairingEngine;
use crate::error::{Result, StealthError};
use crate::group::{GroupElement, GroupId};
use crate::scalar::SecretScalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    Spend,
    View,
    Ephemeral,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRole::Spend => write!(f, "spend"),
            KeyRole::View => write!(f, "view"),
            KeyRole::Ephemeral => write!(f, "ephemeral"),
        }
    }
}

/// Which pairing group holds the spend key
///
/// View and ephemeral keys always occupy the other group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleAssignment {
    #[default]
    SpendG1ViewG2,
    SpendG2ViewG1,
}

impl RoleAssignment {
    pub fn spend_group(self) -> GroupId {
        match self {
            RoleAssignment::SpendG1ViewG2 => GroupId::G1,
            RoleAssignment::SpendG2ViewG1 => GroupId::G2,
        }
    }

    pub fn view_group(self) -> GroupId {
        self.spend_group().other()
    }

    pub fn ephemeral_group(self) -> GroupId {
        self.spend_group().other()
    }

    pub fn group_for(self, role: KeyRole) -> GroupId {
        match role {
            KeyRole::Spend => self.spend_group(),
            KeyRole::View => self.view_group(),
            KeyRole::Ephemeral => self.ephemeral_group(),
        }
    }
}

impl fmt::Display for RoleAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleAssignment::SpendG1ViewG2 => write!(f, "spend-g1"),
            RoleAssignment::SpendG2ViewG1 => write!(f, "spend-g2"),
        }
    }
}

impl FromStr for RoleAssignment {
    type Err = StealthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "spend-g1" | "spend-g1-view-g2" | "g1" => Ok(RoleAssignment::SpendG1ViewG2),
            "spend-g2" | "spend-g2-view-g1" | "g2" => Ok(RoleAssignment::SpendG2ViewG1),
            other => Err(StealthError::InvalidConfig(format!(
                "unknown role assignment '{}', expected spend-g1 or spend-g2",
                other
            ))),
        }
    }
}

/// Derive the public element for a secret scalar in `group`
pub fn derive_public<E: PairingEngine>(
    engine: &E,
    secret: &SecretScalar,
    group: GroupId,
) -> Result<GroupElement> {
    let public = engine.mul_generator(secret.as_field(), group)?;
    if public.is_identity() {
        return Err(StealthError::InvalidKey(format!(
            "{} public key is the identity",
            group
        )));
    }
    Ok(public)
}

/// A secret scalar with its public element for one role
pub struct KeyPair {
    role: KeyRole,
    secret: SecretScalar,
    public: GroupElement,
}

impl KeyPair {
    pub fn generate<E, R>(role: KeyRole, group: GroupId, engine: &E, rng: &mut R) -> Result<Self>
    where
        E: PairingEngine,
        R: RngCore + CryptoRng,
    {
        let secret = SecretScalar::sample(rng)?;
        Self::from_secret(role, secret, group, engine)
    }

    pub fn from_secret<E: PairingEngine>(
        role: KeyRole,
        secret: SecretScalar,
        group: GroupId,
        engine: &E,
    ) -> Result<Self> {
        let public = derive_public(engine, &secret, group)?;
        Ok(Self { role, secret, public })
    }

    /// Role this pair was generated for
    pub fn role(&self) -> KeyRole {
        self.role
    }

    /// Group holding the public element
    pub fn group(&self) -> GroupId {
        self.public.group()
    }

    /// `secret · generator` in `group()`
    pub fn public(&self) -> &GroupElement {
        &self.public
    }

    /// Secret scalar, zeroized on drop
    pub fn secret(&self) -> &SecretScalar {
        &self.secret
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("role", &self.role)
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// The public half of a receiver's keys, shared with senders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaAddress {
    pub spend_public: GroupElement,
    pub view_public: GroupElement,
}

impl MetaAddress {
    /// `stealth:<spend hex>:<view hex>`
    pub fn encode(&self) -> Result<String> {
        Ok(format!(
            "stealth:{}:{}",
            self.spend_public.to_hex()?,
            self.view_public.to_hex()?
        ))
    }

    pub fn decode(input: &str, roles: RoleAssignment) -> Result<Self> {
        let body = input.strip_prefix("stealth:").unwrap_or(input);
        let (spend_hex, view_hex) = body.split_once(':').ok_or_else(|| {
            StealthError::InvalidKey("meta-address must be '<spend>:<view>'".to_string())
        })?;

        Ok(Self {
            spend_public: GroupElement::from_hex(roles.spend_group(), spend_hex)?,
            view_public: GroupElement::from_hex(roles.view_group(), view_hex)?,
        })
    }
}

/// Complete receiver key set: spend and view key pairs
pub struct ReceiverKeys {
    roles: RoleAssignment,
    spend: KeyPair,
    view: KeyPair,
}

impl ReceiverKeys {
    pub fn generate<E, R>(roles: RoleAssignment, engine: &E, rng: &mut R) -> Result<Self>
    where
        E: PairingEngine,
        R: RngCore + CryptoRng,
    {
        let spend = KeyPair::generate(KeyRole::Spend, roles.spend_group(), engine, rng)?;
        let view = KeyPair::generate(KeyRole::View, roles.view_group(), engine, rng)?;
        Ok(Self { roles, spend, view })
    }

    /// Reconstruct keys from stored secrets
    pub fn from_secrets<E: PairingEngine>(
        roles: RoleAssignment,
        spend_secret: SecretScalar,
        view_secret: SecretScalar,
        engine: &E,
    ) -> Result<Self> {
        let spend = KeyPair::from_secret(KeyRole::Spend, spend_secret, roles.spend_group(), engine)?;
        let view = KeyPair::from_secret(KeyRole::View, view_secret, roles.view_group(), engine)?;
        Ok(Self { roles, spend, view })
    }

    pub fn roles(&self) -> RoleAssignment {
        self.roles
    }

    pub fn spend(&self) -> &KeyPair {
        &self.spend
    }

    pub fn view(&self) -> &KeyPair {
        &self.view
    }

    pub fn meta_address(&self) -> MetaAddress {
        MetaAddress {
            spend_public: *self.spend.public(),
            view_public: *self.view.public(),
        }
    }
}

/// Fresh ephemeral key for one payment
pub fn generate_ephemeral<E, R>(roles: RoleAssignment, engine: &E, rng: &mut R) -> Result<KeyPair>
where
    E: PairingEngine,
    R: RngCore + CryptoRng,
{
    KeyPair::generate(KeyRole::Ephemeral, roles.ephemeral_group(), engine, rng)
}

/// Public keys of unrelated ephemeral keys, used as scan decoys
pub fn generate_decoys<E, R>(count: usize, group: GroupId, engine: &E, rng: &mut R) -> Result<Vec<GroupElement>>
where
    E: PairingEngine,
    R: RngCore + CryptoRng,
{
    let mut decoys = Vec::with_capacity(count);
    for _ in 0..count {
        let secret = SecretScalar::sample(rng)?;
        decoys.push(derive_public(engine, &secret, group)?);
    }
    Ok(decoys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Bn254Engine;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_role_groups() {
        let roles = RoleAssignment::SpendG1ViewG2;
        assert_eq!(roles.spend_group(), GroupId::G1);
        assert_eq!(roles.view_group(), GroupId::G2);
        assert_eq!(roles.ephemeral_group(), GroupId::G2);

        let swapped = RoleAssignment::SpendG2ViewG1;
        assert_eq!(swapped.group_for(KeyRole::Spend), GroupId::G2);
        assert_eq!(swapped.group_for(KeyRole::View), GroupId::G1);
        assert_eq!(swapped.group_for(KeyRole::Ephemeral), GroupId::G1);
    }

    #[test]
    fn test_role_assignment_parsing() {
        assert_eq!("spend-g1".parse::<RoleAssignment>().unwrap(), RoleAssignment::SpendG1ViewG2);
        assert_eq!("SPEND-G2".parse::<RoleAssignment>().unwrap(), RoleAssignment::SpendG2ViewG1);
        assert!(matches!(
            "spend-g3".parse::<RoleAssignment>(),
            Err(StealthError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_receiver_keys_land_in_assigned_groups() {
        let engine = Bn254Engine::new();
        let mut rng = StdRng::seed_from_u64(1);

        for roles in [RoleAssignment::SpendG1ViewG2, RoleAssignment::SpendG2ViewG1] {
            let keys = ReceiverKeys::generate(roles, &engine, &mut rng).unwrap();
            assert_eq!(keys.spend().group(), roles.spend_group());
            assert_eq!(keys.view().group(), roles.view_group());
            assert_eq!(keys.spend().role(), KeyRole::Spend);
            assert_eq!(keys.view().role(), KeyRole::View);
            assert!(!keys.spend().public().is_identity());
            assert!(!keys.view().public().is_identity());
        }
    }

    #[test]
    fn test_keys_deterministic_from_secrets() {
        let engine = Bn254Engine::new();
        let mut rng = StdRng::seed_from_u64(2);
        let keys = ReceiverKeys::generate(RoleAssignment::default(), &engine, &mut rng).unwrap();

        let rebuilt = ReceiverKeys::from_secrets(
            keys.roles(),
            keys.spend().secret().clone(),
            keys.view().secret().clone(),
            &engine,
        )
        .unwrap();

        assert_eq!(keys.meta_address(), rebuilt.meta_address());
    }

    #[test]
    fn test_meta_address_roundtrip() {
        let engine = Bn254Engine::new();
        let mut rng = StdRng::seed_from_u64(3);

        for roles in [RoleAssignment::SpendG1ViewG2, RoleAssignment::SpendG2ViewG1] {
            let meta = ReceiverKeys::generate(roles, &engine, &mut rng).unwrap().meta_address();
            let encoded = meta.encode().unwrap();
            assert!(encoded.starts_with("stealth:"));
            assert_eq!(MetaAddress::decode(&encoded, roles).unwrap(), meta);
        }
    }

    #[test]
    fn test_meta_address_rejects_swapped_groups() {
        let engine = Bn254Engine::new();
        let mut rng = StdRng::seed_from_u64(4);
        let meta = ReceiverKeys::generate(RoleAssignment::SpendG1ViewG2, &engine, &mut rng)
            .unwrap()
            .meta_address();
        let encoded = meta.encode().unwrap();

        assert!(MetaAddress::decode(&encoded, RoleAssignment::SpendG2ViewG1).is_err());
    }

    #[test]
    fn test_decoys_are_distinct_and_in_group() {
        let engine = Bn254Engine::new();
        let mut rng = StdRng::seed_from_u64(5);
        let decoys = generate_decoys(16, GroupId::G2, &engine, &mut rng).unwrap();

        assert_eq!(decoys.len(), 16);
        for (i, a) in decoys.iter().enumerate() {
            assert_eq!(a.group(), GroupId::G2);
            for b in &decoys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

//! BN254 group elements: G1, G2 and the pairing target group GT

use std::fmt;

use ark_bn254::{Fq12, Fr, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{Field, One, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StealthError};

/// Compressed encoding length of a G1 point
pub const G1_COMPRESSED_BYTES: usize = 32;

/// Compressed encoding length of a G2 point
pub const G2_COMPRESSED_BYTES: usize = 64;

/// One of the two source groups of the pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupId {
    G1,
    G2,
}

impl GroupId {
    /// The group a pairing partner must come from
    pub fn other(self) -> Self {
        match self {
            GroupId::G1 => GroupId::G2,
            GroupId::G2 => GroupId::G1,
        }
    }

    pub fn compressed_len(self) -> usize {
        match self {
            GroupId::G1 => G1_COMPRESSED_BYTES,
            GroupId::G2 => G2_COMPRESSED_BYTES,
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupId::G1 => write!(f, "G1"),
            GroupId::G2 => write!(f, "G2"),
        }
    }
}

/// A point in G1 or G2, kept in affine form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupElement {
    G1(G1Affine),
    G2(G2Affine),
}

impl GroupElement {
    /// Canonical generator of `group`
    pub fn generator(group: GroupId) -> Self {
        match group {
            GroupId::G1 => GroupElement::G1(G1Affine::generator()),
            GroupId::G2 => GroupElement::G2(G2Affine::generator()),
        }
    }

    /// The source group this point belongs to
    pub fn group(&self) -> GroupId {
        match self {
            GroupElement::G1(_) => GroupId::G1,
            GroupElement::G2(_) => GroupId::G2,
        }
    }

    /// True for the point at infinity
    pub fn is_identity(&self) -> bool {
        match self {
            GroupElement::G1(p) => p.is_zero(),
            GroupElement::G2(p) => p.is_zero(),
        }
    }

    /// Check the point lies on the curve and in the prime-order subgroup
    ///
    /// The identity passes; callers that forbid it check separately.
    pub fn check_subgroup(&self) -> Result<()> {
        let valid = match self {
            GroupElement::G1(p) => {
                p.is_zero() || (p.is_on_curve() && p.is_in_correct_subgroup_assuming_on_curve())
            }
            GroupElement::G2(p) => {
                p.is_zero() || (p.is_on_curve() && p.is_in_correct_subgroup_assuming_on_curve())
            }
        };

        if valid {
            Ok(())
        } else {
            Err(StealthError::MalformedPoint(format!(
                "{} point is not in the prime-order subgroup",
                self.group()
            )))
        }
    }

    /// Subgroup check that also rejects the identity
    pub fn check_non_identity(&self) -> Result<()> {
        if self.is_identity() {
            return Err(StealthError::MalformedPoint(format!(
                "{} identity is not allowed here",
                self.group()
            )));
        }
        self.check_subgroup()
    }

    /// Compressed canonical encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.group().compressed_len());
        match self {
            GroupElement::G1(p) => p.serialize_compressed(&mut bytes)?,
            GroupElement::G2(p) => p.serialize_compressed(&mut bytes)?,
        }
        Ok(bytes)
    }

    /// Decode a compressed point; curve and subgroup membership are validated
    pub fn from_bytes(group: GroupId, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != group.compressed_len() {
            return Err(StealthError::MalformedPoint(format!(
                "{} encoding must be {} bytes, got {}",
                group,
                group.compressed_len(),
                bytes.len()
            )));
        }

        let point = match group {
            GroupId::G1 => G1Affine::deserialize_compressed(bytes).map(GroupElement::G1),
            GroupId::G2 => G2Affine::deserialize_compressed(bytes).map(GroupElement::G2),
        };
        point.map_err(|e| StealthError::MalformedPoint(format!("{} decoding failed: {}", group, e)))
    }

    /// Lowercase hex of the compressed encoding, without a `0x` prefix
    pub fn to_hex(&self) -> Result<String> {
        Ok(hex::encode(self.to_bytes()?))
    }

    /// Decode hex produced by [`GroupElement::to_hex`]; a `0x` prefix is accepted
    pub fn from_hex(group: GroupId, input: &str) -> Result<Self> {
        let trimmed = input.strip_prefix("0x").unwrap_or(input);
        let bytes = hex::decode(trimmed)
            .map_err(|e| StealthError::MalformedPoint(format!("invalid hex: {}", e)))?;
        Self::from_bytes(group, &bytes)
    }
}

/// An element of the pairing target group GT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GtElement(pub(crate) Fq12);

impl GtElement {
    /// True for the neutral element of GT
    pub fn is_identity(&self) -> bool {
        self.0.is_one()
    }

    /// Membership in the order-r subgroup of Fq12*, the image of the pairing
    pub fn is_in_subgroup(&self) -> bool {
        self.0.pow(Fr::MODULUS).is_one()
    }

    /// Canonical encoding, the input to address and tag hashing
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.0.compressed_size());
        self.0.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fq;
    use ark_ec::CurveGroup;

    #[test]
    fn test_other_group() {
        assert_eq!(GroupId::G1.other(), GroupId::G2);
        assert_eq!(GroupId::G2.other(), GroupId::G1);
    }

    #[test]
    fn test_generator_is_valid() {
        for group in [GroupId::G1, GroupId::G2] {
            let g = GroupElement::generator(group);
            assert_eq!(g.group(), group);
            assert!(!g.is_identity());
            assert!(g.check_non_identity().is_ok());
        }
    }

    #[test]
    fn test_identity_rejected_where_disallowed() {
        let identity = GroupElement::G1(G1Affine::zero());
        assert!(identity.check_subgroup().is_ok());
        assert!(matches!(
            identity.check_non_identity(),
            Err(StealthError::MalformedPoint(_))
        ));
    }

    #[test]
    fn test_off_curve_point_rejected() {
        // y^2 = x^3 + 3 does not hold for (1, 1)
        let bogus = GroupElement::G1(G1Affine::new_unchecked(Fq::from(1u64), Fq::from(1u64)));
        assert!(matches!(
            bogus.check_subgroup(),
            Err(StealthError::MalformedPoint(_))
        ));
    }

    #[test]
    fn test_hex_roundtrip_both_groups() {
        let s = Fr::from(1234567u64);
        let p1 = GroupElement::G1((G1Affine::generator() * s).into_affine());
        let p2 = GroupElement::G2((G2Affine::generator() * s).into_affine());

        for p in [p1, p2] {
            let encoded = p.to_hex().unwrap();
            assert_eq!(encoded.len(), p.group().compressed_len() * 2);
            let decoded = GroupElement::from_hex(p.group(), &encoded).unwrap();
            assert_eq!(p, decoded);
        }
    }

    #[test]
    fn test_from_bytes_wrong_length() {
        let err = GroupElement::from_bytes(GroupId::G2, &[0u8; G1_COMPRESSED_BYTES]).unwrap_err();
        assert!(matches!(err, StealthError::MalformedPoint(_)));
    }
}

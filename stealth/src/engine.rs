//! Pairing engine contract and its arkworks BN254 implementation
//!
//! The derivation schemes only talk to the curve through [`PairingEngine`],
//! so every group operation they perform goes through the same input checks.

use ark_bn254::{Bn254, Fr, G1Affine, G2Affine};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{
    field_hashers::{DefaultFieldHasher, HashToField},
    CyclotomicMultSubgroup, PrimeField, Zero,
};
use sha2::Sha256;

use crate::error::{Result, StealthError};
use crate::group::{GroupElement, GroupId, GtElement};

/// Longest domain separator accepted by `expand_message_xmd`
const MAX_DST_LEN: usize = 255;

/// Group and pairing operations the stealth schemes depend on
pub trait PairingEngine: Send + Sync {
    /// Fixed-base multiplication by the canonical generator of `group`
    fn mul_generator(&self, scalar: &Fr, group: GroupId) -> Result<GroupElement>;

    /// Variable-base multiplication
    fn scalar_mul(&self, scalar: &Fr, point: &GroupElement) -> Result<GroupElement>;

    /// Point addition within a single group
    fn add(&self, a: &GroupElement, b: &GroupElement) -> Result<GroupElement>;

    /// Bilinear pairing; the arguments must come from different groups
    fn pair(&self, a: &GroupElement, b: &GroupElement) -> Result<GtElement>;

    /// Exponentiation in the target group
    fn gt_exp(&self, base: &GtElement, exponent: &Fr) -> Result<GtElement>;

    /// Domain-separated hash to the scalar field
    fn hash_to_scalar(&self, msg: &[u8], dst: &[u8]) -> Result<Fr>;
}

/// BN254 backed by arkworks
#[derive(Debug, Clone, Copy, Default)]
pub struct Bn254Engine;

impl Bn254Engine {
    pub fn new() -> Self {
        Self
    }
}

fn reject_zero_scalar(scalar: &Fr) -> Result<()> {
    if scalar.is_zero() {
        return Err(StealthError::InvalidScalar(
            "zero scalar would map every point to the identity".to_string(),
        ));
    }
    Ok(())
}

impl PairingEngine for Bn254Engine {
    fn mul_generator(&self, scalar: &Fr, group: GroupId) -> Result<GroupElement> {
        reject_zero_scalar(scalar)?;
        let point = match group {
            GroupId::G1 => GroupElement::G1((G1Affine::generator() * scalar).into_affine()),
            GroupId::G2 => GroupElement::G2((G2Affine::generator() * scalar).into_affine()),
        };
        Ok(point)
    }

    fn scalar_mul(&self, scalar: &Fr, point: &GroupElement) -> Result<GroupElement> {
        reject_zero_scalar(scalar)?;
        point.check_non_identity()?;
        let product = match point {
            GroupElement::G1(p) => GroupElement::G1((*p * scalar).into_affine()),
            GroupElement::G2(p) => GroupElement::G2((*p * scalar).into_affine()),
        };
        Ok(product)
    }

    fn add(&self, a: &GroupElement, b: &GroupElement) -> Result<GroupElement> {
        a.check_subgroup()?;
        b.check_subgroup()?;
        match (a, b) {
            (GroupElement::G1(x), GroupElement::G1(y)) => {
                Ok(GroupElement::G1((x.into_group() + y).into_affine()))
            }
            (GroupElement::G2(x), GroupElement::G2(y)) => {
                Ok(GroupElement::G2((x.into_group() + y).into_affine()))
            }
            _ => Err(StealthError::MalformedPoint(format!(
                "cannot add a {} point to a {} point",
                a.group(),
                b.group()
            ))),
        }
    }

    fn pair(&self, a: &GroupElement, b: &GroupElement) -> Result<GtElement> {
        a.check_non_identity()?;
        b.check_non_identity()?;

        let (p, q) = match (a, b) {
            (GroupElement::G1(p), GroupElement::G2(q)) | (GroupElement::G2(q), GroupElement::G1(p)) => {
                (*p, *q)
            }
            _ => {
                return Err(StealthError::MalformedPoint(format!(
                    "pairing needs one G1 and one G2 argument, got {} and {}",
                    a.group(),
                    b.group()
                )))
            }
        };

        let miller = Bn254::multi_miller_loop([p], [q]);
        let output = Bn254::final_exponentiation(miller).ok_or_else(|| {
            StealthError::PairingComputationFailure("final exponentiation failed".to_string())
        })?;

        let gt = GtElement(output.0);
        if gt.is_identity() {
            return Err(StealthError::PairingComputationFailure(
                "pairing output is degenerate".to_string(),
            ));
        }
        Ok(gt)
    }

    fn gt_exp(&self, base: &GtElement, exponent: &Fr) -> Result<GtElement> {
        reject_zero_scalar(exponent)?;
        if base.is_identity() {
            return Err(StealthError::MalformedPoint(
                "GT identity cannot be exponentiated meaningfully".to_string(),
            ));
        }
        if !base.is_in_subgroup() {
            return Err(StealthError::MalformedPoint(
                "GT base is not in the order-r subgroup".to_string(),
            ));
        }
        Ok(GtElement(base.0.cyclotomic_exp(exponent.into_bigint())))
    }

    fn hash_to_scalar(&self, msg: &[u8], dst: &[u8]) -> Result<Fr> {
        if dst.is_empty() || dst.len() > MAX_DST_LEN {
            return Err(StealthError::HashToFieldFailure(format!(
                "domain separator must be 1..={} bytes, got {}",
                MAX_DST_LEN,
                dst.len()
            )));
        }

        let hasher = <DefaultFieldHasher<Sha256> as HashToField<Fr>>::new(dst);
        let scalar: Fr = hasher
            .hash_to_field(msg, 1)
            .into_iter()
            .next()
            .ok_or_else(|| StealthError::HashToFieldFailure("hasher returned no elements".to_string()))?;

        if scalar.is_zero() {
            return Err(StealthError::HashToFieldFailure("hash mapped to zero".to_string()));
        }
        Ok(scalar)
    }
}

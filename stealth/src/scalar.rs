//! Secret scalars in the BN254 scalar field
//!
//! Security features:
//! - Uniform sampling from a caller-supplied CSPRNG, with entropy failures
//!   surfaced instead of falling back to a default value
//! - Zero is never a valid secret
//! - Zeroization on drop

use ark_bn254::Fr;
use ark_ff::{BigInt, BigInteger, PrimeField, Zero};
use ark_serialize::CanonicalDeserialize;
use rand::{rngs::OsRng, CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::error::{Result, StealthError};

/// Canonical little-endian encoding length of a scalar
pub const SCALAR_BYTES: usize = 32;

/// Bytes drawn per sample; reducing 512 bits mod r leaves a negligible bias
const WIDE_SAMPLE_BYTES: usize = 64;

/// A zero draw is resampled at most this many times
const MAX_SAMPLE_ATTEMPTS: usize = 8;

/// A non-zero scalar that zeroizes its contents on drop
#[derive(Clone)]
pub struct SecretScalar {
    inner: Fr,
}

impl SecretScalar {
    /// Draw a uniformly random non-zero scalar from `rng`
    pub fn sample<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        for _ in 0..MAX_SAMPLE_ATTEMPTS {
            let mut bytes = [0u8; WIDE_SAMPLE_BYTES];
            rng.try_fill_bytes(&mut bytes)
                .map_err(|e| StealthError::RandomSourceExhausted(e.to_string()))?;
            let scalar = Fr::from_le_bytes_mod_order(&bytes);
            bytes.zeroize();

            if !scalar.is_zero() {
                return Ok(Self { inner: scalar });
            }
        }

        Err(StealthError::RandomSourceExhausted(format!(
            "entropy source produced a zero scalar {} times in a row",
            MAX_SAMPLE_ATTEMPTS
        )))
    }

    /// Draw a scalar from OS entropy
    pub fn generate() -> Result<Self> {
        Self::sample(&mut OsRng)
    }

    /// Wrap a field element, rejecting zero
    pub fn from_field(scalar: Fr) -> Result<Self> {
        if scalar.is_zero() {
            return Err(StealthError::InvalidScalar("scalar is zero".to_string()));
        }
        Ok(Self { inner: scalar })
    }

    /// Parse a canonical little-endian scalar (must be in [1, r))
    pub fn from_bytes(bytes: &[u8; SCALAR_BYTES]) -> Result<Self> {
        let scalar = Fr::deserialize_compressed(&bytes[..]).map_err(|_| {
            StealthError::InvalidScalar("value is not reduced modulo the group order".to_string())
        })?;
        Self::from_field(scalar)
    }

    /// Canonical little-endian encoding
    ///
    /// WARNING: the returned bytes are not zeroized for you.
    pub fn to_bytes(&self) -> [u8; SCALAR_BYTES] {
        let mut out = [0u8; SCALAR_BYTES];
        out.copy_from_slice(&self.inner.into_bigint().to_bytes_le());
        out
    }

    /// Big-integer form, used as the exponent for GT exponentiation
    pub fn to_bigint(&self) -> BigInt<4> {
        self.inner.into_bigint()
    }

    pub(crate) fn as_field(&self) -> &Fr {
        &self.inner
    }
}

impl PartialEq for SecretScalar {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        bool::from(self.to_bytes().ct_eq(&other.to_bytes()))
    }
}

impl Eq for SecretScalar {}

impl Drop for SecretScalar {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl std::fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretScalar").finish_non_exhaustive()
    }
}

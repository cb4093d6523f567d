//! Stealth address values produced by the derivation schemes

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::deriver::SchemeVariant;
use crate::error::Result;
use crate::group::{GroupElement, GtElement};

/// Length of a hashed (variant A) stealth address
pub const ADDRESS_LEN: usize = 20;

/// Domain separator for hashing a pairing output into an address
pub const ADDRESS_DOMAIN: &[u8] = b"pairsap_address_v1";

/// A one-time address as posted by the sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StealthAddress {
    /// Truncated SHA-256 of the shared GT element
    Hashed([u8; ADDRESS_LEN]),
    /// A point in the spend group
    Point(GroupElement),
    /// The shared GT element itself, never hashed
    Raw(GtElement),
}

impl StealthAddress {
    /// Hash a shared pairing output into a 20-byte address
    pub fn hashed_from(shared: &GtElement) -> Result<Self> {
        let mut hasher = Sha256::new();
        hasher.update(ADDRESS_DOMAIN);
        hasher.update(shared.to_bytes()?);
        let digest = hasher.finalize();

        let mut address = [0u8; ADDRESS_LEN];
        address.copy_from_slice(&digest[..ADDRESS_LEN]);
        Ok(StealthAddress::Hashed(address))
    }

    /// The scheme variant that produces this kind of address
    pub fn variant(&self) -> SchemeVariant {
        match self {
            StealthAddress::Hashed(_) => SchemeVariant::HashedPairing,
            StealthAddress::Point(_) => SchemeVariant::AdditivePairing,
            StealthAddress::Raw(_) => SchemeVariant::RawPairing,
        }
    }

    /// Match test used by the scanner
    ///
    /// Hashed addresses are compared in constant time; the other kinds are
    /// compared as group elements.
    pub fn matches(&self, other: &StealthAddress) -> bool {
        match (self, other) {
            (StealthAddress::Hashed(a), StealthAddress::Hashed(b)) => bool::from(a.ct_eq(b)),
            (StealthAddress::Point(a), StealthAddress::Point(b)) => a == b,
            (StealthAddress::Raw(a), StealthAddress::Raw(b)) => a == b,
            _ => false,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            StealthAddress::Hashed(bytes) => Ok(bytes.to_vec()),
            StealthAddress::Point(point) => point.to_bytes(),
            StealthAddress::Raw(gt) => gt.to_bytes(),
        }
    }
}

impl fmt::Display for StealthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes().map_err(|_| fmt::Error)?;
        write!(f, "0x{}", hex::encode(bytes))
    }
}

//! Run configuration shared by the library and the CLI harness

use serde::{Deserialize, Serialize};

use crate::deriver::{SchemeVariant, StealthAddressDeriver};
use crate::engine::Bn254Engine;
use crate::error::{Result, StealthError};
use crate::keys::RoleAssignment;
use crate::scanner::{ScanConfig, Scanner};

/// Decoy keys per scan when nothing else is configured
pub const DEFAULT_POOL_SIZE: usize = 100;

/// Upper bound on a decoy pool; larger pools would only exhaust memory
pub const MAX_POOL_SIZE: usize = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StealthConfig {
    /// Number of decoy ephemeral keys in one scan trial
    pub pool_size: usize,
    pub variant: SchemeVariant,
    pub roles: RoleAssignment,
    pub scan: ScanConfig,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            variant: SchemeVariant::default(),
            roles: RoleAssignment::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl StealthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(StealthError::InvalidConfig(
                "pool_size must be at least 1".to_string(),
            ));
        }
        if self.pool_size > MAX_POOL_SIZE {
            return Err(StealthError::InvalidConfig(format!(
                "pool_size {} exceeds the maximum of {}",
                self.pool_size, MAX_POOL_SIZE
            )));
        }
        self.scan.validate()
    }

    pub fn deriver(&self) -> StealthAddressDeriver<Bn254Engine> {
        StealthAddressDeriver::new(Bn254Engine::new(), self.variant, self.roles)
    }

    /// Validated scanner for this configuration
    pub fn scanner(&self) -> Result<Scanner<Bn254Engine>> {
        self.validate()?;
        Scanner::new(self.deriver(), self.scan)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| StealthError::Serialization(e.to_string()))
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(input).map_err(|e| StealthError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

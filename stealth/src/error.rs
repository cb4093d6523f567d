//! Error taxonomy for stealth address derivation and scanning

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StealthError {
    #[error("Random source exhausted: {0}")]
    RandomSourceExhausted(String),

    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Malformed point: {0}")]
    MalformedPoint(String),

    #[error("Pairing computation failed: {0}")]
    PairingComputationFailure(String),

    #[error("Hash to field failed: {0}")]
    HashToFieldFailure(String),

    /// The address kind was not produced by the deriver's scheme variant
    #[error("Scheme mismatch: {0}")]
    SchemeMismatch(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl From<ark_serialize::SerializationError> for StealthError {
    fn from(err: ark_serialize::SerializationError) -> Self {
        StealthError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StealthError>;

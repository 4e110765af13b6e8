//! Error types for the notary chain.

use thiserror::Error;

/// Failures that abort a single chain operation. The chain is never left
/// partially modified when one of these is returned.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Genesis Block: the genesis body carries no star data")]
    GenesisBlock,

    #[error("MESSAGE EXPIRED: {elapsed}s elapsed, window is {window}s")]
    MessageExpired { elapsed: u64, window: u64 },

    #[error("INVALID SIGNATURE")]
    InvalidSignature,

    #[error("NOT FOUND: no stars registered for {0}")]
    NotFound(String),

    #[error("invalid address {0:?}: must be non-empty and contain no ':'")]
    InvalidAddress(String),

    #[error("malformed ownership message: {0}")]
    MalformedMessage(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),
}

/// Findings collected by a full chain audit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("CHAIN BROKEN at height {height}: previous hash does not match its predecessor")]
    ChainBroken { height: u64 },

    #[error("INVALID BLOCK at height {height}: stored hash does not match contents")]
    InvalidBlock { height: u64 },
}

pub type Result<T> = std::result::Result<T, ChainError>;

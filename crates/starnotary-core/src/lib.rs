//! Append-only hash chain that notarizes star data for wallet addresses.
//!
//! A wallet asks for an ownership message, signs it off-chain, and submits the
//! signature with its star data. Fresh, correctly signed submissions are
//! sealed into a block linked to the previous tip.

pub mod block;
pub mod chain;
pub mod clock;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod message;

pub use block::{Block, Hash, StarRecord};
pub use chain::Blockchain;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ChainConfig;
pub use crypto::{Secp256k1Verifier, SignatureVerifier};
pub use error::{AuditError, ChainError};

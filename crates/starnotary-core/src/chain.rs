use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::block::{Block, Hash, StarRecord};
use crate::clock::Clock;
use crate::config::ChainConfig;
use crate::crypto::SignatureVerifier;
use crate::error::{AuditError, ChainError, Result};
use crate::message::{ownership_message, OwnershipMessage};

/// In-memory notary chain.
///
/// Appends are serialized through the write lock on the block sequence, so
/// height and linkage are always taken from the tail that the new block is
/// pushed onto. Readers share the read lock and see a consistent snapshot.
pub struct Blockchain {
    chain: RwLock<Vec<Block>>,
    pending: Mutex<HashMap<String, u64>>,
    verifier: Arc<dyn SignatureVerifier>,
    clock: Arc<dyn Clock>,
    config: ChainConfig,
}

impl Blockchain {
    /// Create a chain holding only its genesis block.
    pub fn new(
        verifier: impl SignatureVerifier + 'static,
        clock: impl Clock + 'static,
        config: ChainConfig,
    ) -> Result<Self> {
        let mut chain = Vec::with_capacity(1);
        let genesis = commit(&mut chain, Block::new(&config.genesis_seed)?, clock.now());
        info!(hash = ?genesis.hash_hex(), "genesis block created");
        Ok(Self {
            chain: RwLock::new(chain),
            pending: Mutex::new(HashMap::new()),
            verifier: Arc::new(verifier),
            clock: Arc::new(clock),
            config,
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Height of the tip. The genesis block sits at height 0.
    pub async fn height(&self) -> u64 {
        self.chain.read().await.len() as u64 - 1
    }

    pub async fn len(&self) -> usize {
        self.chain.read().await.len()
    }

    /// Link `block` onto the tip and return the committed copy. The payload is
    /// not inspected.
    pub async fn add_block(&self, block: Block) -> Block {
        let mut chain = self.chain.write().await;
        // Read under the lock so block times never run backwards.
        let now = self.clock.now();
        let committed = commit(&mut chain, block, now);
        info!(height = committed.height, hash = ?committed.hash_hex(), "block appended");
        committed
    }

    /// Issue the message `address` must sign before submitting a star.
    /// The address must be non-empty and free of `:` so the message parses back.
    pub async fn request_message_ownership_verification(&self, address: &str) -> Result<String> {
        if address.is_empty() || address.contains(':') {
            return Err(ChainError::InvalidAddress(address.to_string()));
        }
        let now = self.clock.now();
        self.pending.lock().await.insert(address.to_string(), now);
        debug!(address, timestamp = now, "ownership verification requested");
        Ok(ownership_message(address, now))
    }

    /// Timestamp of the latest message issued to `address`, if any.
    pub async fn pending_verification(&self, address: &str) -> Option<u64> {
        self.pending.lock().await.get(address).copied()
    }

    /// Verify freshness and ownership, then notarize `star` for `address`.
    pub async fn submit_star(
        &self,
        address: &str,
        message: &str,
        signature: &str,
        star: serde_json::Value,
    ) -> Result<Block> {
        let parsed = OwnershipMessage::parse(message)?;
        let window = self.config.verification_window_secs;
        let elapsed = parsed.elapsed(self.clock.now());
        if elapsed > window {
            warn!(address, elapsed, window, "ownership message expired");
            return Err(ChainError::MessageExpired { elapsed, window });
        }

        if !self.verifier.verify(address, message, signature) {
            warn!(address, "signature rejected");
            return Err(ChainError::InvalidSignature);
        }

        let record = StarRecord {
            address: address.to_string(),
            message: message.to_string(),
            signature: signature.to_string(),
            star,
        };
        let block = Block::new(&record)?;
        Ok(self.add_block(block).await)
    }

    pub async fn block_by_height(&self, height: u64) -> Option<Block> {
        let chain = self.chain.read().await;
        usize::try_from(height)
            .ok()
            .and_then(|h| chain.get(h))
            .cloned()
    }

    /// All blocks carrying `hash`, or `None` when nothing matches.
    pub async fn block_by_hash(&self, hash: &Hash) -> Option<Vec<Block>> {
        let chain = self.chain.read().await;
        let found: Vec<Block> = chain
            .iter()
            .filter(|b| b.hash.as_ref() == Some(hash))
            .cloned()
            .collect();
        (!found.is_empty()).then_some(found)
    }

    /// Star records owned by `address`, oldest first.
    pub async fn stars_by_wallet_address(&self, address: &str) -> Result<Vec<StarRecord>> {
        let chain = self.chain.read().await;
        let mut stars = Vec::new();
        for block in chain.iter().skip(1) {
            match block.star_record() {
                Ok(record) if record.address == address => stars.push(record),
                Ok(_) => {}
                Err(e) => debug!(height = block.height, "skipping undecodable body: {e}"),
            }
        }
        if stars.is_empty() {
            return Err(ChainError::NotFound(address.to_string()));
        }
        Ok(stars)
    }

    /// Audit every block. Problems are collected rather than returned early;
    /// an empty list means the chain is intact.
    pub async fn validate_chain(&self) -> Vec<AuditError> {
        let chain = self.chain.read().await;
        let mut errors = Vec::new();
        for (index, block) in chain.iter().enumerate() {
            let height = index as u64;
            if !block.validate() {
                errors.push(AuditError::InvalidBlock { height });
            }
            if index > 0 && block.previous_block_hash != chain[index - 1].hash {
                errors.push(AuditError::ChainBroken { height });
            }
        }
        for error in &errors {
            warn!("{error}");
        }
        errors
    }
}

/// Sole mutation path for the sequence.
fn commit(chain: &mut Vec<Block>, mut block: Block, now: u64) -> Block {
    block.height = chain.len() as u64;
    block.time = now;
    block.previous_block_hash = chain.last().and_then(|tip| tip.hash);
    block.hash = Some(block.compute_hash());
    chain.push(block.clone());
    block
}

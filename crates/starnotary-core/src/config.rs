use serde::Deserialize;

use crate::constants::{GENESIS_SEED, VERIFICATION_WINDOW_SECS};

/// Tunables for a [`crate::chain::Blockchain`].
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// How long a signed ownership message stays acceptable, in seconds.
    #[serde(default = "default_window")]
    pub verification_window_secs: u64,
    /// Payload of the genesis block.
    #[serde(default = "default_genesis_seed")]
    pub genesis_seed: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            verification_window_secs: default_window(),
            genesis_seed: default_genesis_seed(),
        }
    }
}

fn default_window() -> u64 {
    VERIFICATION_WINDOW_SECS
}

fn default_genesis_seed() -> String {
    GENESIS_SEED.to_string()
}

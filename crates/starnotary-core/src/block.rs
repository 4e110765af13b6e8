use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{ChainError, Result};

pub type Hash = [u8; 32];

/// Star data notarized for an address, as stored in a block body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarRecord {
    pub address: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub signature: String,
    #[serde(rename = "data", default)]
    pub star: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(with = "hex_hash")]
    pub hash: Option<Hash>,
    pub height: u64,
    /// Hex of the JSON-serialized payload.
    pub body: String,
    pub time: u64,
    #[serde(with = "hex_hash")]
    pub previous_block_hash: Option<Hash>,
}

impl Block {
    /// Wrap `payload` in an uncommitted block. Height, time, linkage and hash
    /// are filled in when the block is appended to a chain.
    pub fn new<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        let json = serde_json::to_vec(payload).map_err(|e| ChainError::Encoding(e.to_string()))?;
        Ok(Self {
            hash: None,
            height: 0,
            body: hex::encode(json),
            time: 0,
            previous_block_hash: None,
        })
    }

    /// Bytes covered by the block hash; the `hash` field itself is excluded.
    pub fn hash_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + 8 + 8 + self.body.len() + 1 + 32);
        bytes.extend_from_slice(&self.height.to_le_bytes());
        bytes.extend_from_slice(&self.time.to_le_bytes());
        bytes.extend_from_slice(&(self.body.len() as u64).to_le_bytes());
        bytes.extend_from_slice(self.body.as_bytes());
        match &self.previous_block_hash {
            Some(prev) => {
                bytes.push(1);
                bytes.extend_from_slice(prev);
            }
            None => bytes.push(0),
        }
        bytes
    }

    pub fn compute_hash(&self) -> Hash {
        Sha256::digest(self.hash_bytes()).into()
    }

    /// True iff a hash is stored and it matches the current contents.
    pub fn validate(&self) -> bool {
        self.hash.is_some_and(|stored| stored == self.compute_hash())
    }

    /// Decode the payload. The genesis body is a seed, not star data, and is
    /// refused.
    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T> {
        if self.height == 0 {
            return Err(ChainError::GenesisBlock);
        }
        let decoded = hex::decode(&self.body).map_err(|e| ChainError::Decoding(e.to_string()))?;
        debug!(height = self.height, bytes = decoded.len(), "decoded block body");
        serde_json::from_slice(&decoded).map_err(|e| ChainError::Decoding(e.to_string()))
    }

    pub fn star_record(&self) -> Result<StarRecord> {
        self.decode_body()
    }

    pub fn hash_hex(&self) -> Option<String> {
        self.hash.map(hex::encode)
    }
}

/// Serialize `Option<Hash>` as a hex string or `null`.
mod hex_hash {
    use super::Hash;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &Option<Hash>, s: S) -> Result<S::Ok, S::Error> {
        match hash {
            Some(h) => s.serialize_some(&hex::encode(h)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Hash>, D::Error> {
        let Some(text) = Option::<String>::deserialize(d)? else {
            return Ok(None);
        };
        let mut out = [0u8; 32];
        hex::decode_to_slice(&text, &mut out).map_err(D::Error::custom)?;
        Ok(Some(out))
    }
}

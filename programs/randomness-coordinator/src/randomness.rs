//! Domain-separated derivation of the value handed to consumers.
//!
//! The operator's raw output is never delivered as-is. It is mixed with the
//! coordinator instance, the chain and the request id:
//!
//! ```text
//! randomness = SHA-256(raw || instance || chain_id_le || request_id_le)
//! ```
//!
//! so one raw value reused across requests, coordinator instances or forked
//! chains yields unrelated outputs.

use std::fmt;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::state::{ChainId, Identity, RequestId};

/// The 256-bit value submitted by the operator.
pub type RawRandomness = [u8; 32];

/// A derived 32-byte random value, unique to one request of one coordinator.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Randomness([u8; 32]);

impl Randomness {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 8 bytes as a little-endian `u64`.
    pub fn to_u64(&self) -> u64 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.0[..8]);
        u64::from_le_bytes(word)
    }

    /// Expand into `num_words` values: `word[i] = SHA-256(randomness || i_le_bytes)`.
    pub fn expand(&self, num_words: u32) -> Vec<[u8; 32]> {
        let mut words: Vec<[u8; 32]> = Vec::with_capacity(num_words as usize);
        for i in 0..num_words {
            let mut hasher = Sha256::new();
            hasher.update(self.0);
            hasher.update(i.to_le_bytes());
            words.push(hasher.finalize().into());
        }
        words
    }
}

impl fmt::Debug for Randomness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Randomness({self})")
    }
}

impl fmt::Display for Randomness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for Randomness {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Widen a `u64` into the big-endian 256-bit integer representation.
pub fn raw_from_u64(value: u64) -> RawRandomness {
    let mut raw = [0u8; 32];
    raw[24..].copy_from_slice(&value.to_be_bytes());
    raw
}

/// Derive the consumer-facing value for `request_id`.
pub fn derive_randomness(
    raw: &RawRandomness,
    instance: &Identity,
    chain_id: ChainId,
    request_id: RequestId,
) -> Randomness {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    hasher.update(instance.as_bytes());
    hasher.update(chain_id.to_le_bytes());
    hasher.update(request_id.to_le_bytes());
    Randomness(hasher.finalize().into())
}

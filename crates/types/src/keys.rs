//! Opaque public keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A producer signing key.
///
/// Signature creation and verification live outside the core; the core only
/// stores the key a producer registered with and hands it back to the block
/// validation layer. 32 raw bytes, compared bytewise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// The all-zero key, used as a placeholder before a producer re-keys.
    pub const ZERO: Self = PublicKey([0u8; 32]);

    /// Build a key from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        PublicKey(bytes)
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

//! Identifier newtypes.
//!
//! Every entity in the core is keyed by one of these. They are ordinary value
//! types with a total order so they can key `BTreeMap`s (deterministic
//! iteration is a replay requirement, see the crate docs).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of an account (the unique entity key).
///
/// Names are short, human-readable strings (`"init0"`, `"alice"`). Producer
/// candidates are identified by the name of their owning account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountName(String);

impl AccountName {
    /// Create an account name.
    pub fn new(name: impl Into<String>) -> Self {
        AccountName(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountName {
    fn from(s: &str) -> Self {
        AccountName(s.to_owned())
    }
}

impl From<String> for AccountName {
    fn from(s: String) -> Self {
        AccountName(s)
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Absolute slot number (monotonically increasing).
///
/// Exactly one producer is scheduled per slot. Slots advance whether or not a
/// block was actually produced at them; a slot with no block is a miss.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Slot(pub u64);

impl Slot {
    /// The slot at which the chain starts.
    pub const GENESIS: Self = Slot(0);

    /// Get the next slot.
    pub fn next(self) -> Self {
        Slot(self.0 + 1)
    }

    /// Number of slots elapsed since `earlier` (zero if `earlier` is later).
    pub fn elapsed_since(self, earlier: Slot) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// The round this slot falls in, for a given round length.
    pub fn round(self, blocks_per_round: u64) -> u64 {
        self.0 / blocks_per_round
    }

    /// Position of this slot within its round.
    pub fn round_offset(self, blocks_per_round: u64) -> u64 {
        self.0 % blocks_per_round
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

/// Block number (position in the chain, strictly sequential).
///
/// Distinct from [`Slot`]: block numbers count blocks actually produced,
/// slots count scheduling opportunities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockNum(pub u64);

impl BlockNum {
    /// Get the next block number.
    pub fn next(self) -> Self {
        BlockNum(self.0 + 1)
    }
}

impl fmt::Display for BlockNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.0)
    }
}

/// Transaction identity, used for duplicate rejection.
///
/// The driver derives this from the signed transaction digest; the core only
/// compares ids, it never hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    /// Build an id from raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        TxId(bytes)
    }
}

impl fmt::Display for TxId {
    // Short hex prefix, enough to correlate log lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

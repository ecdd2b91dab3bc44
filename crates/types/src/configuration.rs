//! Governance configuration and its median fold.

use crate::Amount;
use serde::{Deserialize, Serialize};

/// The tunable blockchain parameters governed by producer voting.
///
/// Exactly seven fields: three structural size limits and four
/// currency-denominated economic parameters. Each field is independently
/// ordinal and independently aggregated; there is no cross-field invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainConfiguration {
    /// Hard upper bound on serialized block size, in bytes.
    pub max_block_size: u32,
    /// Size producers aim for when filling blocks, in bytes.
    pub target_block_size: u32,
    /// Hard upper bound on a single serialized transaction, in bytes.
    pub max_transaction_size: u32,
    /// Flat fee charged per transaction.
    pub base_per_transaction_fee: Amount,
    /// Fee charged per signature carried by a transaction.
    pub per_signature_fee: Amount,
    /// Per-round pay for producers in the active set.
    pub producer_pay: Amount,
    /// Per-round pay for registered producers outside the active set.
    pub standby_pay: Amount,
}

impl Default for BlockchainConfiguration {
    fn default() -> Self {
        Self {
            max_block_size: 1024 * 1024,
            target_block_size: 512 * 1024,
            max_transaction_size: 64 * 1024,
            base_per_transaction_fee: Amount(100),
            per_signature_fee: Amount(10),
            producer_pay: Amount(1000),
            standby_pay: Amount(100),
        }
    }
}

impl BlockchainConfiguration {
    /// Field-wise median of the submitted configurations.
    ///
    /// Every registered producer's preference participates, not just the
    /// active set's. Each of the seven fields is sorted independently and the
    /// middle element taken; for an even number of submissions the lower of
    /// the two middle elements is used (averaging would not be meaningful for
    /// ordinal fields, and replay requires one pinned policy).
    ///
    /// Returns the default configuration when `values` is empty.
    pub fn median(values: &[BlockchainConfiguration]) -> BlockchainConfiguration {
        if values.is_empty() {
            return BlockchainConfiguration::default();
        }
        BlockchainConfiguration {
            max_block_size: median_by(values, |c| c.max_block_size),
            target_block_size: median_by(values, |c| c.target_block_size),
            max_transaction_size: median_by(values, |c| c.max_transaction_size),
            base_per_transaction_fee: median_by(values, |c| c.base_per_transaction_fee),
            per_signature_fee: median_by(values, |c| c.per_signature_fee),
            producer_pay: median_by(values, |c| c.producer_pay),
            standby_pay: median_by(values, |c| c.standby_pay),
        }
    }
}

/// Lower-middle element of one field across all submissions.
fn median_by<T: Ord + Copy>(
    values: &[BlockchainConfiguration],
    field: impl Fn(&BlockchainConfiguration) -> T,
) -> T {
    let mut column: Vec<T> = values.iter().map(field).collect();
    column.sort_unstable();
    column[(column.len() - 1) / 2]
}

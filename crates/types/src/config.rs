//! Chain-wide constants.

use crate::{BlockchainConfiguration, ChainError};
use serde::{Deserialize, Serialize};

/// Default number of slots per round.
pub const DEFAULT_BLOCKS_PER_ROUND: u64 = 21;

/// Default size of the active producer set.
pub const DEFAULT_PRODUCER_COUNT: usize = 21;

/// Default unstaking cooldown: three days of one-second slots.
pub const DEFAULT_UNSTAKE_COOLDOWN_SLOTS: u64 = 3 * 24 * 60 * 60;

/// Default number of recently applied transaction ids retained for
/// duplicate rejection.
pub const DEFAULT_RECENT_TX_HORIZON: usize = 1024;

/// Static chain configuration.
///
/// Fixed at genesis; the tunable parameters that producers govern live in
/// [`BlockchainConfiguration`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Slots per round. The active producer schedule indexes by
    /// `slot % blocks_per_round`, so this must equal `producer_count`.
    pub blocks_per_round: u64,
    /// Number of producers in the active set.
    pub producer_count: usize,
    /// Slots that must elapse between `begin_unstake` and any withdrawal.
    pub unstake_cooldown_slots: u64,
    /// Transaction ids retained for duplicate rejection.
    pub recent_tx_horizon: usize,
    /// Governance parameters in force until the first median recomputation.
    pub initial_configuration: BlockchainConfiguration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            blocks_per_round: DEFAULT_BLOCKS_PER_ROUND,
            producer_count: DEFAULT_PRODUCER_COUNT,
            unstake_cooldown_slots: DEFAULT_UNSTAKE_COOLDOWN_SLOTS,
            recent_tx_horizon: DEFAULT_RECENT_TX_HORIZON,
            initial_configuration: BlockchainConfiguration::default(),
        }
    }
}

impl ChainConfig {
    /// Set the unstaking cooldown.
    pub fn with_cooldown(mut self, slots: u64) -> Self {
        self.unstake_cooldown_slots = slots;
        self
    }

    /// Set the round length and active-set size together (they must agree).
    pub fn with_round_size(mut self, producers: usize) -> Self {
        self.blocks_per_round = producers as u64;
        self.producer_count = producers;
        self
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.blocks_per_round == 0 || self.producer_count == 0 {
            return Err(ChainError::InvalidGenesis {
                reason: "round length and producer count must be non-zero".into(),
            });
        }
        if self.blocks_per_round != self.producer_count as u64 {
            return Err(ChainError::InvalidGenesis {
                reason: format!(
                    "blocks_per_round ({}) must equal producer_count ({})",
                    self.blocks_per_round, self.producer_count
                ),
            });
        }
        Ok(())
    }
}

//! Chain-global properties.

use crate::{AccountName, BlockchainConfiguration, Slot};
use serde::{Deserialize, Serialize};

/// The per-round global state: active producer schedule and effective
/// governance parameters.
///
/// This is an owned, versioned value object, not an ambient singleton. Round
/// transitions build a fresh instance and replace the old one wholesale, so a
/// reader holding a clone observes a consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalProperties {
    /// Bumped by one on every wholesale replacement.
    pub version: u64,
    /// This round's schedule, in slot order. Length equals the configured
    /// producer count; `slot % blocks_per_round` indexes into it.
    pub active_producers: Vec<AccountName>,
    /// The governance parameters currently in force.
    pub configuration: BlockchainConfiguration,
    /// First slot of the round this schedule was derived for.
    pub round_start_slot: Slot,
}

impl GlobalProperties {
    /// Properties in force at genesis, before the first round transition.
    pub fn genesis(
        active_producers: Vec<AccountName>,
        configuration: BlockchainConfiguration,
    ) -> Self {
        Self {
            version: 0,
            active_producers,
            configuration,
            round_start_slot: Slot::GENESIS,
        }
    }

    /// The producer scheduled for an absolute slot.
    ///
    /// Pure function of this round's schedule: `slot % blocks_per_round`.
    pub fn producer_for_slot(&self, slot: Slot, blocks_per_round: u64) -> &AccountName {
        let index = slot.round_offset(blocks_per_round) as usize;
        &self.active_producers[index]
    }

    /// Whether a producer is in the active set.
    pub fn is_active(&self, producer: &AccountName) -> bool {
        self.active_producers.contains(producer)
    }
}

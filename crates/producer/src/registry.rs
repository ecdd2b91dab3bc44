//! The producer candidate registry.

use spindle_types::{
    AccountName, BlockNum, BlockchainConfiguration, ChainError, PublicKey, Slot,
};
use std::collections::BTreeMap;
use tracing::debug;

/// A registered block producer candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Producer {
    /// The owning account; also the producer's name.
    pub owner: AccountName,
    /// Key the producer signs blocks with. Stored, never verified here.
    pub signing_key: PublicKey,
    /// This producer's vote on the governance parameters.
    pub preferences: BlockchainConfiguration,
    /// Last slot at which this producer actually produced. Zero until the
    /// first block.
    pub last_slot: Slot,
    /// Assigned slots that passed without a block.
    pub total_missed: u64,
    /// Number of the last block this producer confirmed.
    pub last_confirmed_block_num: BlockNum,
    /// Registration sequence number; pins the deterministic tie-break in
    /// active-set selection.
    pub registered_seq: u64,
}

/// Every producer candidate, keyed by owner name.
///
/// Candidates are never destroyed; dropping out of the active set just means
/// not being selected at the next round boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerRegistry {
    producers: BTreeMap<AccountName, Producer>,
    next_seq: u64,
}

impl ProducerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new candidate.
    pub fn register(
        &mut self,
        owner: AccountName,
        signing_key: PublicKey,
        preferences: BlockchainConfiguration,
    ) -> Result<(), ChainError> {
        if self.producers.contains_key(&owner) {
            return Err(ChainError::ProducerAlreadyExists { name: owner });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        debug!(producer = %owner, seq, "producer registered");
        self.producers.insert(
            owner.clone(),
            Producer {
                owner,
                signing_key,
                preferences,
                last_slot: Slot::GENESIS,
                total_missed: 0,
                last_confirmed_block_num: BlockNum(0),
                registered_seq: seq,
            },
        );
        Ok(())
    }

    /// Re-key a producer and optionally replace its configuration preference.
    pub fn update(
        &mut self,
        owner: &AccountName,
        signing_key: PublicKey,
        preferences: Option<BlockchainConfiguration>,
    ) -> Result<(), ChainError> {
        let producer = self
            .producers
            .get_mut(owner)
            .ok_or_else(|| ChainError::UnknownProducer { name: owner.clone() })?;
        producer.signing_key = signing_key;
        if let Some(preferences) = preferences {
            producer.preferences = preferences;
        }
        Ok(())
    }

    /// Look up a producer.
    pub fn get(&self, owner: &AccountName) -> Result<&Producer, ChainError> {
        self.producers
            .get(owner)
            .ok_or_else(|| ChainError::UnknownProducer { name: owner.clone() })
    }

    /// Whether a producer is registered.
    pub fn contains(&self, owner: &AccountName) -> bool {
        self.producers.contains_key(owner)
    }

    /// Record a produced block.
    pub fn record_produced(
        &mut self,
        owner: &AccountName,
        slot: Slot,
        block_num: BlockNum,
    ) -> Result<(), ChainError> {
        let producer = self
            .producers
            .get_mut(owner)
            .ok_or_else(|| ChainError::UnknownProducer { name: owner.clone() })?;
        producer.last_slot = slot;
        producer.last_confirmed_block_num = block_num;
        Ok(())
    }

    /// Record a scheduled slot that passed without a block.
    pub fn record_missed(&mut self, owner: &AccountName, slot: Slot) -> Result<(), ChainError> {
        let producer = self
            .producers
            .get_mut(owner)
            .ok_or_else(|| ChainError::UnknownProducer { name: owner.clone() })?;
        producer.total_missed += 1;
        debug!(producer = %owner, %slot, total_missed = producer.total_missed, "slot missed");
        Ok(())
    }

    /// Iterate producers in owner-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountName, &Producer)> {
        self.producers.iter()
    }

    /// Every registered producer's configuration preference, in owner order.
    /// Governance aggregation runs over all of these, active or not.
    pub fn preferences(&self) -> Vec<BlockchainConfiguration> {
        self.producers.values().map(|p| p.preferences).collect()
    }

    /// Number of registered producers.
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    /// Whether no producer is registered.
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

//! Per-producer vote tallies.

use spindle_types::{AccountName, Amount};
use std::collections::BTreeMap;

/// Aggregated vote weight per registered producer.
///
/// Holds, for every registered candidate, the exact sum of staked balances of
/// each account whose effective voter approves it. Updated synchronously with
/// every ledger or delegation mutation by [`crate::StakingState`]; the only
/// batch path is [`Self::reset`] + re-accumulation at round boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteTallyIndex {
    tallies: BTreeMap<AccountName, Amount>,
}

impl VoteTallyIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly registered producer, starting at zero.
    pub fn register(&mut self, producer: AccountName) {
        self.tallies.entry(producer).or_insert(Amount::ZERO);
    }

    /// Whether a producer is tracked.
    pub fn contains(&self, producer: &AccountName) -> bool {
        self.tallies.contains_key(producer)
    }

    /// Current tally for a producer (zero if untracked).
    pub fn tally(&self, producer: &AccountName) -> Amount {
        self.tallies.get(producer).copied().unwrap_or(Amount::ZERO)
    }

    /// Add weight to a producer's tally. Untracked producers are ignored;
    /// callers validate registration before routing weight.
    pub fn add_weight(&mut self, producer: &AccountName, weight: Amount) {
        if let Some(tally) = self.tallies.get_mut(producer) {
            *tally = tally.saturating_add(weight);
        }
    }

    /// Remove weight from a producer's tally.
    pub fn sub_weight(&mut self, producer: &AccountName, weight: Amount) {
        if let Some(tally) = self.tallies.get_mut(producer) {
            *tally = tally.saturating_sub(weight);
        }
    }

    /// Zero every tally, keeping the registered set. Used by the full rebuild
    /// at round boundaries.
    pub fn reset(&mut self) {
        for tally in self.tallies.values_mut() {
            *tally = Amount::ZERO;
        }
    }

    /// Iterate `(producer, tally)` in producer-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountName, Amount)> {
        self.tallies.iter().map(|(name, tally)| (name, *tally))
    }

    /// Number of tracked producers.
    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    /// Whether no producer is tracked.
    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }
}

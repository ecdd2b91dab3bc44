//! Active-set selection and round transitions.

use crate::ProducerRegistry;
use spindle_staking::VoteTallyIndex;
use spindle_types::{AccountName, Amount, BlockchainConfiguration, GlobalProperties, Slot};
use std::cmp::Reverse;
use tracing::info;

/// Select the top `count` producers by current tally.
///
/// Ties are broken by registration order (earlier registration wins); the
/// resulting schedule is ordered by owner name. Both orderings are pinned so
/// that every replica derives the identical schedule.
pub fn select_active_set(
    registry: &ProducerRegistry,
    tallies: &VoteTallyIndex,
    count: usize,
) -> Vec<AccountName> {
    let mut ranked: Vec<(Amount, u64, &AccountName)> = registry
        .iter()
        .map(|(name, producer)| (tallies.tally(name), producer.registered_seq, name))
        .collect();
    ranked.sort_by_key(|&(tally, seq, _)| (Reverse(tally), seq));

    let mut selected: Vec<AccountName> = ranked
        .into_iter()
        .take(count)
        .map(|(_, _, name)| name.clone())
        .collect();
    selected.sort();
    selected
}

/// Derive the global properties for the round starting at `round_start_slot`.
///
/// Performed atomically at a round boundary, in this order: re-derive the
/// active set from the tallies, recompute the effective configuration as the
/// field-wise median over **all** registered producers' preferences, then
/// replace the properties wholesale (version bumped). Changes made during a
/// round are visible in tallies immediately but take effect here, one round
/// later, which keeps the schedule stable against mid-round churn.
pub fn next_round_properties(
    previous: &GlobalProperties,
    registry: &ProducerRegistry,
    tallies: &VoteTallyIndex,
    producer_count: usize,
    round_start_slot: Slot,
) -> GlobalProperties {
    let active_producers = select_active_set(registry, tallies, producer_count);
    let configuration = if registry.is_empty() {
        previous.configuration
    } else {
        BlockchainConfiguration::median(&registry.preferences())
    };
    let properties = GlobalProperties {
        version: previous.version + 1,
        active_producers,
        configuration,
        round_start_slot,
    };
    info!(
        version = properties.version,
        %round_start_slot,
        active = properties.active_producers.len(),
        registered = registry.len(),
        "round transition"
    );
    properties
}

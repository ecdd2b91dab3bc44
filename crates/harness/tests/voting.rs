//! Producer voting acceptance tests: approvals, delegation, round latency.

use spindle_harness::TestChain;
use spindle_types::{ChainConfig, ChainError};

fn chain() -> TestChain {
    TestChain::with_config(ChainConfig::default().with_round_size(3))
}

/// Vote for a fresh producer; he gets in on the next round, but not before.
#[test]
fn test_voted_producer_joins_next_round() {
    let mut chain = chain();
    chain.produce_block();

    chain.create_account("init0", "joe", 1000).unwrap();
    chain.create_account("init0", "bob", 1000).unwrap();
    chain.stake("bob", 100).unwrap();
    chain.register_producer("joe", 42).unwrap();
    chain.approve_producer("bob", "joe", true).unwrap();
    chain.produce_rest_of_round();

    // Tally reflects the approval immediately...
    let joe: spindle_types::AccountName = "joe".into();
    assert!(chain.state().approved_producers(&"bob".into()).contains(&joe));
    assert_eq!(chain.balances("bob").1, 100);
    assert_eq!(chain.tally("joe"), 100);
    // ...but the schedule only changes at the boundary.
    assert!(!chain.is_active("joe"));

    chain.produce_block();
    assert!(chain.is_active("joe"));

    // Withdrawing the approval empties the tally at once.
    chain.approve_producer("bob", "joe", false).unwrap();
    chain.produce_block();
    assert!(chain.state().approved_producers(&"bob".into()).is_empty());
    assert_eq!(chain.tally("joe"), 0);
}

/// Same as above, but the vote is cast before any stake exists.
#[test]
fn test_vote_first_stake_later() {
    let mut chain = chain();
    chain.produce_block();

    chain.create_account("init0", "joe", 1000).unwrap();
    chain.create_account("init0", "bob", 1000).unwrap();
    chain.register_producer("joe", 42).unwrap();
    chain.approve_producer("bob", "joe", true).unwrap();
    chain.produce_block();

    // Approved, but weightless so far.
    assert_eq!(chain.balances("bob").1, 0);
    assert_eq!(chain.tally("joe"), 0);

    chain.stake("bob", 100).unwrap();
    chain.produce_rest_of_round();
    assert_eq!(chain.tally("joe"), 100);
    assert!(!chain.is_active("joe"));

    chain.produce_block();
    assert!(chain.is_active("joe"));
}

/// One proxy-voting run: execute the given actions in order, then verify the
/// stakeholder's weight reached the producer through the proxy.
fn run_proxy_ordering(order: &[usize]) -> Result<(), ChainError> {
    let mut chain = chain();
    chain.produce_block();

    chain.create_account("init0", "stakeholder", 1000).unwrap();
    chain.create_account("init0", "proxy", 1000).unwrap();
    chain.create_account("init0", "producer", 1000).unwrap();
    chain.register_producer("producer", 42).unwrap();

    for &action in order {
        match action {
            0 => chain.approve_producer("proxy", "producer", true)?,
            1 => chain.allow_proxying("proxy", true)?,
            2 => chain.set_proxy("stakeholder", "proxy")?,
            _ => chain.stake("stakeholder", 100)?,
        }
    }
    chain.produce_rest_of_round();

    let producer: spindle_types::AccountName = "producer".into();
    assert!(chain
        .state()
        .approved_producers(&"proxy".into())
        .contains(&producer));
    assert_eq!(chain.balances("stakeholder").1, 100);
    assert_eq!(chain.tally("producer"), 100);

    chain.produce_block();
    assert!(chain.is_active("producer"));

    chain.approve_producer("proxy", "producer", false)?;
    chain.produce_block();
    assert_eq!(chain.tally("producer"), 0);
    Ok(())
}

/// Every legal interleaving of approve / allow-proxy / set-proxy / stake
/// converges to the same tallies; the illegal ones fail on the set-proxy
/// precondition.
#[test]
fn test_proxy_voting_is_order_independent() {
    // All 24 permutations of the four actions.
    let mut orders = Vec::new();
    for a in 0..4usize {
        for b in 0..4 {
            for c in 0..4 {
                for d in 0..4 {
                    let order = [a, b, c, d];
                    let mut seen = [false; 4];
                    order.iter().for_each(|&x| seen[x] = true);
                    if seen.iter().all(|&s| s) {
                        orders.push(order);
                    }
                }
            }
        }
    }
    assert_eq!(orders.len(), 24);

    for order in orders {
        let allow_at = order.iter().position(|&x| x == 1);
        let proxy_at = order.iter().position(|&x| x == 2);
        let legal = allow_at < proxy_at;
        let result = run_proxy_ordering(&order);
        if legal {
            result.unwrap_or_else(|err| panic!("order {order:?} failed: {err}"));
        } else {
            assert_eq!(
                result.unwrap_err(),
                ChainError::ProxyNotAccepting { proxy: "proxy".into() },
                "order {order:?} should fail the set-proxy precondition"
            );
        }
    }
}

/// A proxied account's stake stops counting for its own approvals and starts
/// counting for the proxy's, and back again when the proxy is cleared.
#[test]
fn test_clearing_proxy_restores_direct_votes() {
    let mut chain = chain();
    chain.create_account("init0", "carol", 1000).unwrap();
    chain.create_account("init0", "proxy", 1000).unwrap();
    chain.create_account("init0", "prod", 1000).unwrap();
    chain.register_producer("prod", 42).unwrap();

    chain.stake("carol", 60).unwrap();
    chain.approve_producer("carol", "prod", true).unwrap();
    assert_eq!(chain.tally("prod"), 60);

    chain.allow_proxying("proxy", true).unwrap();
    chain.set_proxy("carol", "proxy").unwrap();
    // The proxy approves nothing, so carol's weight goes quiet.
    assert_eq!(chain.tally("prod"), 0);

    chain.clear_proxy("carol").unwrap();
    assert_eq!(chain.tally("prod"), 60);
}

proptest::proptest! {
    /// Convergence as a property: after any random mix of staking and
    /// delegation operations, the incrementally maintained tally agrees with
    /// the full rebuild a round boundary performs.
    #[test]
    fn prop_incremental_tally_matches_rebuild(
        ops in proptest::collection::vec((0u8..6, 0u64..120), 1..50)
    ) {
        let mut chain = chain();
        chain.create_account("init0", "a", 500).unwrap();
        chain.create_account("init0", "b", 500).unwrap();
        chain.create_account("init0", "prod", 500).unwrap();
        chain.register_producer("prod", 42).unwrap();
        chain.allow_proxying("b", true).unwrap();

        for (kind, amount) in ops {
            let _ = match kind {
                0 => chain.stake("a", amount),
                1 => chain.stake("b", amount),
                2 => chain.begin_unstake("a", amount),
                3 => chain.approve_producer("a", "prod", amount % 2 == 0),
                4 => chain.set_proxy("a", "b"),
                _ => chain.clear_proxy("a"),
            };
        }

        // Cross a round boundary: the transition rebuilds the index from
        // scratch, so the tally surviving it proves the increments were exact.
        let incremental = chain.tally("prod");
        chain.produce_rest_of_round();
        chain.produce_block();
        proptest::prop_assert_eq!(chain.tally("prod"), incremental);
    }
}

/// Stake changes made while proxied flow through the proxy's approvals.
#[test]
fn test_stake_changes_flow_through_proxy() {
    let mut chain = chain();
    chain.create_account("init0", "carol", 1000).unwrap();
    chain.create_account("init0", "proxy", 1000).unwrap();
    chain.create_account("init0", "prod", 1000).unwrap();
    chain.register_producer("prod", 42).unwrap();

    chain.allow_proxying("proxy", true).unwrap();
    chain.approve_producer("proxy", "prod", true).unwrap();
    chain.set_proxy("carol", "proxy").unwrap();

    chain.stake("carol", 80).unwrap();
    assert_eq!(chain.tally("prod"), 80);
    chain.begin_unstake("carol", 30).unwrap();
    assert_eq!(chain.tally("prod"), 50);
    chain.stake("carol", 10).unwrap();
    assert_eq!(chain.tally("prod"), 60);
}

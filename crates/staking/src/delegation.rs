//! The delegation graph: who votes on whose behalf.

use spindle_types::{AccountName, Amount};
use std::collections::{BTreeMap, BTreeSet};

/// One account's delegation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationRecord {
    /// Where this account's vote weight is routed. None = votes directly.
    pub proxy_target: Option<AccountName>,
    /// Whether other accounts may proxy to this one.
    pub accepts_proxying: bool,
    /// Producers this account approves with its own voice. Dormant while the
    /// account is proxied, but preserved: clearing the proxy routes weight
    /// straight back through this set.
    pub approved_producers: BTreeSet<AccountName>,
    /// Aggregate staked weight of the accounts currently proxying here.
    /// Maintained incrementally so approval changes cost O(approvals), not a
    /// scan over all delegators.
    pub proxied_weight: Amount,
}

/// Per-account proxy targets and approval sets.
///
/// Resolution is explicitly depth-one: the effective voter of `a` is `a`'s
/// proxy target if set, otherwise `a` itself. A proxy that itself proxies
/// onward does not forward its delegators' weight (its own stake routes
/// onward, its delegators' does not).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationGraph {
    records: BTreeMap<AccountName, DelegationRecord>,
}

impl DelegationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a default record for a newly created account.
    pub fn ensure(&mut self, name: &AccountName) {
        self.records.entry(name.clone()).or_default();
    }

    /// Look up a record.
    pub fn record(&self, name: &AccountName) -> Option<&DelegationRecord> {
        self.records.get(name)
    }

    /// Look up a record mutably, creating it if absent.
    pub fn record_mut(&mut self, name: &AccountName) -> &mut DelegationRecord {
        self.records.entry(name.clone()).or_default()
    }

    /// The account whose approval set counts `name`'s stake.
    pub fn effective_voter(&self, name: &AccountName) -> AccountName {
        self.records
            .get(name)
            .and_then(|record| record.proxy_target.clone())
            .unwrap_or_else(|| name.clone())
    }

    /// Whether `proxy` currently accepts proxied votes.
    pub fn accepts_proxying(&self, proxy: &AccountName) -> bool {
        self.records
            .get(proxy)
            .map(|record| record.accepts_proxying)
            .unwrap_or(false)
    }

    /// The producers approved by `name`'s own record (not its proxy's).
    pub fn approvals(&self, name: &AccountName) -> BTreeSet<AccountName> {
        self.records
            .get(name)
            .map(|record| record.approved_producers.clone())
            .unwrap_or_default()
    }

    /// Iterate records in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountName, &DelegationRecord)> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> AccountName {
        AccountName::from(s)
    }

    #[test]
    fn test_effective_voter_defaults_to_self() {
        let mut graph = DelegationGraph::new();
        graph.ensure(&name("alice"));
        assert_eq!(graph.effective_voter(&name("alice")), name("alice"));
        // Unknown accounts also resolve to themselves.
        assert_eq!(graph.effective_voter(&name("ghost")), name("ghost"));
    }

    #[test]
    fn test_effective_voter_resolves_one_hop_only() {
        let mut graph = DelegationGraph::new();
        graph.record_mut(&name("a")).proxy_target = Some(name("b"));
        graph.record_mut(&name("b")).proxy_target = Some(name("c"));
        // Depth-one: a resolves to b, never chased through to c.
        assert_eq!(graph.effective_voter(&name("a")), name("b"));
        assert_eq!(graph.effective_voter(&name("b")), name("c"));
    }

    #[test]
    fn test_accepts_proxying_defaults_off() {
        let mut graph = DelegationGraph::new();
        graph.ensure(&name("p"));
        assert!(!graph.accepts_proxying(&name("p")));
        graph.record_mut(&name("p")).accepts_proxying = true;
        assert!(graph.accepts_proxying(&name("p")));
    }
}

//! Staking state: the ledger, delegation graph and tally index wired together.

use crate::{DelegationGraph, StakeLedger, VoteTallyIndex};
use spindle_types::{AccountName, Amount, ChainError, Slot};
use std::collections::BTreeSet;
use tracing::{debug, instrument, trace};

/// The voting-weight side of the chain state.
///
/// Owns the choreography between the three components: every balance or
/// delegation mutation is reflected in the tallies before the operation
/// returns, so the index is exact at all times. Every operation validates all
/// of its preconditions before touching anything; a returned error implies
/// zero effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StakingState {
    ledger: StakeLedger,
    delegation: DelegationGraph,
    tally: VoteTallyIndex,
}

impl StakingState {
    /// Create an empty staking state.
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────────────────────────────────────────────────────
    // Accounts and balances
    // ───────────────────────────────────────────────────────────────────────

    /// Open a genesis account seeded with liquid funds.
    pub fn open_genesis_account(
        &mut self,
        name: AccountName,
        liquid: Amount,
    ) -> Result<(), ChainError> {
        self.ledger.open_genesis(name.clone(), liquid)?;
        self.delegation.ensure(&name);
        Ok(())
    }

    /// Open an account funded from the creator's liquid pool.
    #[instrument(skip(self), fields(%creator, %name, %deposit))]
    pub fn create_account(
        &mut self,
        creator: &AccountName,
        name: AccountName,
        deposit: Amount,
    ) -> Result<(), ChainError> {
        self.ledger.open_funded(creator, name.clone(), deposit)?;
        self.delegation.ensure(&name);
        Ok(())
    }

    /// Move liquid funds between accounts. Staked and unstaking pools are
    /// untouched, so no vote weight moves.
    pub fn transfer(
        &mut self,
        from: &AccountName,
        to: &AccountName,
        amount: Amount,
    ) -> Result<(), ChainError> {
        self.ledger.transfer(from, to, amount)
    }

    /// Stake liquid funds, growing the account's vote weight.
    #[instrument(skip(self), fields(%account, %amount))]
    pub fn stake(&mut self, account: &AccountName, amount: Amount) -> Result<(), ChainError> {
        self.ledger.stake(account, amount)?;
        self.route_weight(account, amount, Routing::Add);
        Ok(())
    }

    /// Start (or restart) unstaking; see [`StakeLedger::begin_unstake`] for
    /// the supersede semantics.
    #[instrument(skip(self), fields(%account, %amount, %now))]
    pub fn begin_unstake(
        &mut self,
        account: &AccountName,
        amount: Amount,
        now: Slot,
    ) -> Result<(), ChainError> {
        let staked_before = self.ledger.account(account)?.staked;
        self.ledger.begin_unstake(account, amount, now)?;
        let staked_after = self.ledger.account(account)?.staked;
        // Folding the old unstaking pool back in can grow the staked balance
        // as well as shrink it; route whichever delta resulted.
        if staked_after > staked_before {
            self.route_weight(account, staked_after.saturating_sub(staked_before), Routing::Add);
        } else {
            self.route_weight(account, staked_before.saturating_sub(staked_after), Routing::Sub);
        }
        Ok(())
    }

    /// Withdraw matured unstaking funds. The staked pool (and therefore every
    /// tally) is unaffected.
    #[instrument(skip(self), fields(%account, %amount, %now))]
    pub fn finish_unstake(
        &mut self,
        account: &AccountName,
        amount: Amount,
        now: Slot,
        cooldown_slots: u64,
    ) -> Result<(), ChainError> {
        self.ledger.finish_unstake(account, amount, now, cooldown_slots)
    }

    // ───────────────────────────────────────────────────────────────────────
    // Delegation
    // ───────────────────────────────────────────────────────────────────────

    /// Toggle whether `account` accepts proxied votes.
    ///
    /// Disabling does not evict accounts already proxying here; it only
    /// closes the door to new ones.
    pub fn allow_proxying(
        &mut self,
        account: &AccountName,
        enabled: bool,
    ) -> Result<(), ChainError> {
        self.ledger.account(account)?;
        self.delegation.record_mut(account).accepts_proxying = enabled;
        Ok(())
    }

    /// Route `account`'s vote weight through `proxy` (or back to itself for
    /// `None`). Existing approvals are re-routed, not just future ones.
    #[instrument(skip(self), fields(%account, proxy = proxy.as_ref().map(|p| p.as_str())))]
    pub fn set_proxy(
        &mut self,
        account: &AccountName,
        proxy: Option<AccountName>,
    ) -> Result<(), ChainError> {
        self.ledger.account(account)?;
        if let Some(target) = &proxy {
            if target == account {
                return Err(ChainError::ProxyToSelf {
                    account: account.clone(),
                });
            }
            self.ledger.account(target)?;
            if !self.delegation.accepts_proxying(target) {
                return Err(ChainError::ProxyNotAccepting {
                    proxy: target.clone(),
                });
            }
        }
        let current = self
            .delegation
            .record(account)
            .and_then(|record| record.proxy_target.clone());
        if current == proxy {
            return Ok(());
        }

        // Unroute the account's staked weight from the old effective voter,
        // switch targets, then route it through the new one.
        let weight = self.ledger.account(account)?.staked;
        self.route_weight(account, weight, Routing::Sub);
        self.delegation.record_mut(account).proxy_target = proxy;
        self.route_weight(account, weight, Routing::Add);
        Ok(())
    }

    /// Add or remove `producer` in the approval set of `account`'s effective
    /// voter, resolved now (a later `set_proxy` re-routes the whole set).
    #[instrument(skip(self), fields(%account, %producer, approve))]
    pub fn approve_producer(
        &mut self,
        account: &AccountName,
        producer: &AccountName,
        approve: bool,
    ) -> Result<(), ChainError> {
        self.ledger.account(account)?;
        if !self.tally.contains(producer) {
            return Err(ChainError::UnknownProducer {
                name: producer.clone(),
            });
        }
        let voter = self.delegation.effective_voter(account);
        let already_approved = self
            .delegation
            .record(&voter)
            .map(|record| record.approved_producers.contains(producer))
            .unwrap_or(false);
        if approve && already_approved {
            return Err(ChainError::DuplicateApproval {
                account: voter,
                producer: producer.clone(),
            });
        }
        if !approve && !already_approved {
            return Err(ChainError::ApprovalNotFound {
                account: voter,
                producer: producer.clone(),
            });
        }

        let weight = self.voting_weight(&voter);
        let approvals = &mut self.delegation.record_mut(&voter).approved_producers;
        if approve {
            approvals.insert(producer.clone());
            self.tally.add_weight(producer, weight);
        } else {
            approvals.remove(producer);
            self.tally.sub_weight(producer, weight);
        }
        debug!(%voter, %producer, %weight, approve, "approval changed");
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────
    // Producers and tallies
    // ───────────────────────────────────────────────────────────────────────

    /// Start tracking a newly registered producer at tally zero. Approvals
    /// can only reference registered producers, so there is never existing
    /// weight to pick up.
    pub fn track_producer(&mut self, producer: AccountName) {
        self.tally.register(producer);
    }

    /// Current tally for a producer.
    pub fn tally(&self, producer: &AccountName) -> Amount {
        self.tally.tally(producer)
    }

    /// The tally index, for active-set selection.
    pub fn tallies(&self) -> &VoteTallyIndex {
        &self.tally
    }

    /// Recompute every tally from scratch.
    ///
    /// The incremental updates keep the index exact; this is the belt-and-
    /// braces pass run once per round boundary before schedule selection.
    pub fn rebuild_tallies(&mut self) {
        self.tally.reset();
        let stakes: Vec<(AccountName, Amount)> = self
            .ledger
            .iter()
            .map(|(name, account)| (name.clone(), account.staked))
            .collect();
        for (name, staked) in stakes {
            if staked.is_zero() {
                continue;
            }
            let voter = self.delegation.effective_voter(&name);
            for producer in self.delegation.approvals(&voter) {
                self.tally.add_weight(&producer, staked);
            }
        }
    }

    // ───────────────────────────────────────────────────────────────────────
    // Queries
    // ───────────────────────────────────────────────────────────────────────

    /// `(liquid, staked, unstaking)` for an account.
    pub fn balance_triplet(
        &self,
        account: &AccountName,
    ) -> Result<(Amount, Amount, Amount), ChainError> {
        Ok(self.ledger.account(account)?.balance_triplet())
    }

    /// The producers approved by `account`'s own record.
    pub fn approved_producers(&self, account: &AccountName) -> BTreeSet<AccountName> {
        self.delegation.approvals(account)
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &StakeLedger {
        &self.ledger
    }

    /// The underlying delegation graph.
    pub fn delegation(&self) -> &DelegationGraph {
        &self.delegation
    }

    // ───────────────────────────────────────────────────────────────────────
    // Internals
    // ───────────────────────────────────────────────────────────────────────

    /// Total weight currently speaking through `voter`'s approval set: the
    /// voter's own stake (unless it proxies onward) plus everything proxied
    /// to it.
    fn voting_weight(&self, voter: &AccountName) -> Amount {
        let own = match self.delegation.record(voter) {
            Some(record) if record.proxy_target.is_some() => Amount::ZERO,
            _ => self
                .ledger
                .account(voter)
                .map(|account| account.staked)
                .unwrap_or(Amount::ZERO),
        };
        let proxied = self
            .delegation
            .record(voter)
            .map(|record| record.proxied_weight)
            .unwrap_or(Amount::ZERO);
        own.saturating_add(proxied)
    }

    /// Apply a staked-weight delta for `account` through its effective voter:
    /// adjust the voter's proxied aggregate (when distinct) and every
    /// approved producer's tally.
    fn route_weight(&mut self, account: &AccountName, amount: Amount, routing: Routing) {
        if amount.is_zero() {
            return;
        }
        let voter = self.delegation.effective_voter(account);
        if voter != *account {
            let aggregate = &mut self.delegation.record_mut(&voter).proxied_weight;
            *aggregate = match routing {
                Routing::Add => aggregate.saturating_add(amount),
                Routing::Sub => aggregate.saturating_sub(amount),
            };
        }
        for producer in self.delegation.approvals(&voter) {
            match routing {
                Routing::Add => self.tally.add_weight(&producer, amount),
                Routing::Sub => self.tally.sub_weight(&producer, amount),
            }
            trace!(%account, %voter, %producer, %amount, ?routing, "routed stake weight");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Routing {
    Add,
    Sub,
}

//! The composed chain state and its block lifecycle.

use crate::{CommitSink, Operation, Transaction};
use spindle_producer::{next_round_properties, Producer, ProducerRegistry};
use spindle_staking::StakingState;
use spindle_types::{
    AccountName, Amount, BlockNum, ChainConfig, ChainError, GlobalProperties, PublicKey, Slot,
    TxId,
};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, instrument};

/// Initial chain contents: seeded accounts and the founding producer set.
#[derive(Debug, Clone)]
pub struct Genesis {
    /// Accounts opened at genesis with their liquid balance.
    pub accounts: Vec<(AccountName, Amount)>,
    /// The founding producers; must be exactly `producer_count` of them and
    /// each must own a genesis account.
    pub producers: Vec<(AccountName, PublicKey)>,
}

/// The whole state-transition core, owned as one value.
///
/// Driven from outside, per block: `begin_block` injects the slot clock,
/// `apply_transaction` runs each authorized operation atomically,
/// `on_block_produced` / `on_slot_missed` record production statistics (the
/// former also performs slot-driven round transitions), and `close_block`
/// hands a consistent snapshot to the storage collaborator.
///
/// Two instances fed the identical call sequence compare equal — balances,
/// tallies and global properties are all `BTreeMap`-backed value state with
/// no clocks, randomness or floats anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainState {
    config: ChainConfig,
    staking: StakingState,
    registry: ProducerRegistry,
    properties: GlobalProperties,
    head_block_num: BlockNum,
    current_slot: Slot,
    recent_txs: RecentTxWindow,
}

impl ChainState {
    /// Build the state a chain starts from.
    pub fn new(config: ChainConfig, genesis: Genesis) -> Result<Self, ChainError> {
        config.validate()?;
        if genesis.producers.len() != config.producer_count {
            return Err(ChainError::InvalidGenesis {
                reason: format!(
                    "genesis names {} producers, config requires {}",
                    genesis.producers.len(),
                    config.producer_count
                ),
            });
        }

        let mut staking = StakingState::new();
        for (name, liquid) in genesis.accounts {
            staking.open_genesis_account(name, liquid)?;
        }

        let mut registry = ProducerRegistry::new();
        for (owner, signing_key) in &genesis.producers {
            if staking.ledger().account(owner).is_err() {
                return Err(ChainError::InvalidGenesis {
                    reason: format!("producer {owner} has no genesis account"),
                });
            }
            registry.register(owner.clone(), *signing_key, config.initial_configuration)?;
            staking.track_producer(owner.clone());
        }

        // The founding schedule, in the same name order later selections use.
        let mut schedule: Vec<AccountName> =
            genesis.producers.into_iter().map(|(owner, _)| owner).collect();
        schedule.sort();
        let properties = GlobalProperties::genesis(schedule, config.initial_configuration);

        let recent_txs = RecentTxWindow::new(config.recent_tx_horizon);
        Ok(Self {
            config,
            staking,
            registry,
            properties,
            head_block_num: BlockNum(0),
            current_slot: Slot::GENESIS,
            recent_txs,
        })
    }

    // ───────────────────────────────────────────────────────────────────────
    // Block lifecycle
    // ───────────────────────────────────────────────────────────────────────

    /// Inject the slot the block under application occupies. Operations that
    /// read the clock (unstaking cooldowns) see this value.
    pub fn begin_block(&mut self, slot: Slot) {
        debug_assert!(slot >= self.current_slot, "slot clock must not run backwards");
        self.current_slot = slot;
    }

    /// Apply one authorized transaction, atomically: every precondition is
    /// validated before any mutation, so an error means zero effect.
    #[instrument(skip(self, tx), fields(id = %tx.id, op = tx.operation.type_name()))]
    pub fn apply_transaction(&mut self, tx: &Transaction) -> Result<(), ChainError> {
        tx.validate_structure()?;
        if self.recent_txs.contains(&tx.id) {
            return Err(ChainError::DuplicateTransaction { id: tx.id });
        }
        self.apply_operation(&tx.operation)?;
        self.recent_txs.insert(tx.id);
        Ok(())
    }

    /// The producer scheduled for an absolute slot. Pure; reflects the round
    /// the current properties were derived for.
    pub fn slot_to_producer(&self, slot: Slot) -> &AccountName {
        self.properties
            .producer_for_slot(slot, self.config.blocks_per_round)
    }

    /// Record a produced block and advance the chain head.
    ///
    /// Crossing into a new round (by absolute slot arithmetic, so missed
    /// slots cannot defer it past the next produced block) atomically
    /// rebuilds the tally index, re-derives the active set, recomputes the
    /// effective configuration over all registered producers, and replaces
    /// the global properties wholesale.
    pub fn on_block_produced(
        &mut self,
        producer: &AccountName,
        slot: Slot,
    ) -> Result<(), ChainError> {
        let block_num = self.head_block_num.next();
        self.registry.record_produced(producer, slot, block_num)?;
        self.head_block_num = block_num;
        self.current_slot = slot;
        debug!(%producer, %slot, %block_num, "block produced");

        let blocks_per_round = self.config.blocks_per_round;
        if slot.round(blocks_per_round) > self.properties.round_start_slot.round(blocks_per_round)
        {
            let round_start = Slot(slot.0 - slot.round_offset(blocks_per_round));
            self.round_boundary_reached(round_start);
        }
        Ok(())
    }

    /// The once-per-round transition: full tally rebuild, active-set
    /// re-derivation, governance median over all registered producers, and a
    /// wholesale properties replacement.
    fn round_boundary_reached(&mut self, round_start: Slot) {
        self.staking.rebuild_tallies();
        self.properties = next_round_properties(
            &self.properties,
            &self.registry,
            self.staking.tallies(),
            self.config.producer_count,
            round_start,
        );
    }

    /// Record a scheduled slot that passed without a block.
    pub fn on_slot_missed(&mut self, producer: &AccountName, slot: Slot) -> Result<(), ChainError> {
        self.registry.record_missed(producer, slot)
    }

    /// Hand the storage collaborator a consistent snapshot of the closed
    /// block's state.
    pub fn close_block(&self, sink: &mut dyn CommitSink) {
        sink.commit_block(self.head_block_num, self);
    }

    // ───────────────────────────────────────────────────────────────────────
    // Queries
    // ───────────────────────────────────────────────────────────────────────

    /// `(liquid, staked, unstaking)` for an account.
    pub fn balance_triplet(
        &self,
        account: &AccountName,
    ) -> Result<(Amount, Amount, Amount), ChainError> {
        self.staking.balance_triplet(account)
    }

    /// Look up a producer record.
    pub fn producer(&self, name: &AccountName) -> Result<&Producer, ChainError> {
        self.registry.get(name)
    }

    /// The producers approved by an account's own record.
    pub fn approved_producers(&self, account: &AccountName) -> BTreeSet<AccountName> {
        self.staking.approved_producers(account)
    }

    /// The properties currently in force.
    pub fn global_properties(&self) -> &GlobalProperties {
        &self.properties
    }

    /// Current vote tally for a producer.
    pub fn tally(&self, producer: &AccountName) -> Amount {
        self.staking.tally(producer)
    }

    /// Number of the last applied block.
    pub fn head_block_num(&self) -> BlockNum {
        self.head_block_num
    }

    /// The slot clock as last injected.
    pub fn current_slot(&self) -> Slot {
        self.current_slot
    }

    /// The static chain configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// The staking component (read-only).
    pub fn staking(&self) -> &StakingState {
        &self.staking
    }

    /// The producer registry (read-only).
    pub fn registry(&self) -> &ProducerRegistry {
        &self.registry
    }

    // ───────────────────────────────────────────────────────────────────────
    // Dispatch
    // ───────────────────────────────────────────────────────────────────────

    fn apply_operation(&mut self, operation: &Operation) -> Result<(), ChainError> {
        match operation {
            Operation::CreateAccount {
                creator,
                name,
                deposit,
            } => self.staking.create_account(creator, name.clone(), *deposit),

            Operation::Transfer { from, to, amount } => self.staking.transfer(from, to, *amount),

            Operation::Stake { account, amount } => self.staking.stake(account, *amount),

            Operation::BeginUnstake { account, amount } => {
                self.staking.begin_unstake(account, *amount, self.current_slot)
            }

            Operation::FinishUnstake { account, amount } => self.staking.finish_unstake(
                account,
                *amount,
                self.current_slot,
                self.config.unstake_cooldown_slots,
            ),

            Operation::SetProxy { account, proxy } => {
                self.staking.set_proxy(account, proxy.clone())
            }

            Operation::AllowProxying { account, enabled } => {
                self.staking.allow_proxying(account, *enabled)
            }

            Operation::ApproveProducer {
                account,
                producer,
                approve,
            } => self.staking.approve_producer(account, producer, *approve),

            Operation::RegisterProducer {
                owner,
                signing_key,
                preferences,
            } => {
                // The owning account must exist before it can stand.
                self.staking.ledger().account(owner)?;
                self.registry
                    .register(owner.clone(), *signing_key, *preferences)?;
                self.staking.track_producer(owner.clone());
                Ok(())
            }

            Operation::UpdateProducer {
                owner,
                signing_key,
                preferences,
            } => self.registry.update(owner, *signing_key, *preferences),
        }
    }
}

/// Sliding window of recently applied transaction ids.
///
/// Bounds memory while covering the duplicate-rejection horizon: the oldest
/// id is evicted once the window is full.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RecentTxWindow {
    ids: BTreeSet<TxId>,
    order: VecDeque<TxId>,
    horizon: usize,
}

impl RecentTxWindow {
    fn new(horizon: usize) -> Self {
        Self {
            ids: BTreeSet::new(),
            order: VecDeque::new(),
            horizon,
        }
    }

    fn contains(&self, id: &TxId) -> bool {
        self.ids.contains(id)
    }

    fn insert(&mut self, id: TxId) {
        if !self.ids.insert(id) {
            return;
        }
        self.order.push_back(id);
        while self.order.len() > self.horizon {
            if let Some(evicted) = self.order.pop_front() {
                self.ids.remove(&evicted);
            }
        }
    }
}

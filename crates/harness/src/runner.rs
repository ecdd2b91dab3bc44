//! The test chain driver.

use crate::MemorySink;
use spindle_chain::{ChainState, Genesis, Operation, Transaction};
use spindle_types::{
    AccountName, Amount, BlockchainConfiguration, ChainConfig, ChainError, PublicKey, Slot, TxId,
};

/// Liquid balance every genesis account starts with.
pub const GENESIS_ACCOUNT_BALANCE: Amount = Amount(100_000);

/// Build the standard genesis for a configuration: one account per producer
/// slot, named `init0`, `init1`, ..., each seeded with
/// [`GENESIS_ACCOUNT_BALANCE`] and registered as a founding producer.
pub fn default_genesis(config: &ChainConfig) -> Genesis {
    let accounts: Vec<(AccountName, Amount)> = (0..config.producer_count)
        .map(|i| (AccountName::new(format!("init{i}")), GENESIS_ACCOUNT_BALANCE))
        .collect();
    let producers: Vec<(AccountName, PublicKey)> = (0..config.producer_count)
        .map(|i| {
            let mut key = [0u8; 32];
            key[0] = i as u8;
            (AccountName::new(format!("init{i}")), PublicKey::from_bytes(key))
        })
        .collect();
    Genesis { accounts, producers }
}

/// A chain plus the driver state needed to produce blocks against it.
///
/// Transactions pushed between blocks accumulate into the block being built
/// at the next slot; `produce_block` then closes it. Missed slots advance the
/// clock without a block and charge the scheduled producer.
#[derive(Debug)]
pub struct TestChain {
    state: ChainState,
    sink: MemorySink,
    next_slot: Slot,
    tx_counter: u64,
}

impl TestChain {
    /// A default chain: 21 producers, 21-slot rounds, 3-day cooldown.
    pub fn new() -> Self {
        Self::with_config(ChainConfig::default())
    }

    /// A chain with a custom configuration and the matching default genesis.
    pub fn with_config(config: ChainConfig) -> Self {
        let genesis = default_genesis(&config);
        Self::with_genesis(config, genesis)
    }

    /// A chain with explicit genesis contents.
    pub fn with_genesis(config: ChainConfig, genesis: Genesis) -> Self {
        let state = ChainState::new(config, genesis).expect("genesis must be valid");
        Self {
            state,
            sink: MemorySink::new(),
            next_slot: Slot(1),
            tx_counter: 0,
        }
    }

    /// The chain state under test.
    pub fn state(&self) -> &ChainState {
        &self.state
    }

    /// Everything committed so far.
    pub fn sink(&self) -> &MemorySink {
        &self.sink
    }

    /// Slot the next produced block will occupy.
    pub fn next_slot(&self) -> Slot {
        self.next_slot
    }

    // ───────────────────────────────────────────────────────────────────────
    // Block production
    // ───────────────────────────────────────────────────────────────────────

    /// Produce the block for the next slot, signed off by whoever is
    /// scheduled there.
    pub fn produce_block(&mut self) {
        let slot = self.next_slot;
        let producer = self.state.slot_to_producer(slot).clone();
        self.state.begin_block(slot);
        self.state
            .on_block_produced(&producer, slot)
            .expect("scheduled producer must be registered");
        self.state.close_block(&mut self.sink);
        self.next_slot = slot.next();
    }

    /// Produce `count` consecutive blocks.
    pub fn produce_blocks(&mut self, count: u64) {
        for _ in 0..count {
            self.produce_block();
        }
    }

    /// Let the next slot pass without a block, charging its producer.
    pub fn miss_slot(&mut self) {
        let slot = self.next_slot;
        let producer = self.state.slot_to_producer(slot).clone();
        self.state
            .on_slot_missed(&producer, slot)
            .expect("scheduled producer must be registered");
        self.next_slot = slot.next();
    }

    /// Miss `count` consecutive slots.
    pub fn miss_slots(&mut self, count: u64) {
        for _ in 0..count {
            self.miss_slot();
        }
    }

    /// Produce blocks up to, but not including, the first slot of the next
    /// round.
    pub fn produce_rest_of_round(&mut self) {
        let blocks_per_round = self.state.config().blocks_per_round;
        while self.next_slot.round_offset(blocks_per_round) != 0 {
            self.produce_block();
        }
    }

    // ───────────────────────────────────────────────────────────────────────
    // Transactions
    // ───────────────────────────────────────────────────────────────────────

    /// Wrap an operation in a fresh envelope and apply it to the block being
    /// built. No notify parties are added; use the named helpers for
    /// operations that require them.
    pub fn push_operation(&mut self, operation: Operation) -> Result<(), ChainError> {
        let tx = Transaction::new(self.next_tx_id(), operation);
        self.push_transaction(&tx)
    }

    /// Apply a fully built transaction to the block being built.
    pub fn push_transaction(&mut self, tx: &Transaction) -> Result<(), ChainError> {
        self.state.begin_block(self.next_slot);
        self.state.apply_transaction(tx)
    }

    /// Deterministic envelope ids: little-endian counter bytes.
    pub fn next_tx_id(&mut self) -> TxId {
        self.tx_counter += 1;
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&self.tx_counter.to_le_bytes());
        TxId::from_bytes(bytes)
    }

    // ───────────────────────────────────────────────────────────────────────
    // Operation helpers, one per kind
    // ───────────────────────────────────────────────────────────────────────

    /// Open `name` funded by `creator`.
    pub fn create_account(
        &mut self,
        creator: &str,
        name: &str,
        deposit: u64,
    ) -> Result<(), ChainError> {
        self.push_operation(Operation::CreateAccount {
            creator: creator.into(),
            name: name.into(),
            deposit: Amount(deposit),
        })
    }

    /// Transfer with the recipient properly notified.
    pub fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<(), ChainError> {
        let tx = Transaction::new(
            self.next_tx_id(),
            Operation::Transfer {
                from: from.into(),
                to: to.into(),
                amount: Amount(amount),
            },
        )
        .with_notify(vec![to.into()]);
        self.push_transaction(&tx)
    }

    pub fn stake(&mut self, account: &str, amount: u64) -> Result<(), ChainError> {
        self.push_operation(Operation::Stake {
            account: account.into(),
            amount: Amount(amount),
        })
    }

    pub fn begin_unstake(&mut self, account: &str, amount: u64) -> Result<(), ChainError> {
        self.push_operation(Operation::BeginUnstake {
            account: account.into(),
            amount: Amount(amount),
        })
    }

    pub fn finish_unstake(&mut self, account: &str, amount: u64) -> Result<(), ChainError> {
        self.push_operation(Operation::FinishUnstake {
            account: account.into(),
            amount: Amount(amount),
        })
    }

    pub fn set_proxy(&mut self, account: &str, proxy: &str) -> Result<(), ChainError> {
        self.push_operation(Operation::SetProxy {
            account: account.into(),
            proxy: Some(proxy.into()),
        })
    }

    pub fn clear_proxy(&mut self, account: &str) -> Result<(), ChainError> {
        self.push_operation(Operation::SetProxy {
            account: account.into(),
            proxy: None,
        })
    }

    pub fn allow_proxying(&mut self, account: &str, enabled: bool) -> Result<(), ChainError> {
        self.push_operation(Operation::AllowProxying {
            account: account.into(),
            enabled,
        })
    }

    pub fn approve_producer(
        &mut self,
        account: &str,
        producer: &str,
        approve: bool,
    ) -> Result<(), ChainError> {
        self.push_operation(Operation::ApproveProducer {
            account: account.into(),
            producer: producer.into(),
            approve,
        })
    }

    pub fn register_producer(&mut self, owner: &str, key_seed: u8) -> Result<(), ChainError> {
        self.push_operation(Operation::RegisterProducer {
            owner: owner.into(),
            signing_key: PublicKey::from_bytes([key_seed; 32]),
            preferences: BlockchainConfiguration::default(),
        })
    }

    pub fn update_producer(
        &mut self,
        owner: &str,
        key_seed: u8,
        preferences: Option<BlockchainConfiguration>,
    ) -> Result<(), ChainError> {
        self.push_operation(Operation::UpdateProducer {
            owner: owner.into(),
            signing_key: PublicKey::from_bytes([key_seed; 32]),
            preferences,
        })
    }

    /// Replace a producer's configuration preference, keeping its current key.
    pub fn update_producer_preferences(
        &mut self,
        owner: &str,
        preferences: BlockchainConfiguration,
    ) -> Result<(), ChainError> {
        let signing_key = self.state.producer(&owner.into())?.signing_key;
        self.push_operation(Operation::UpdateProducer {
            owner: owner.into(),
            signing_key,
            preferences: Some(preferences),
        })
    }

    // ───────────────────────────────────────────────────────────────────────
    // Query shorthand
    // ───────────────────────────────────────────────────────────────────────

    /// `(liquid, staked, unstaking)` as raw units.
    pub fn balances(&self, account: &str) -> (u64, u64, u64) {
        let (liquid, staked, unstaking) = self
            .state
            .balance_triplet(&account.into())
            .expect("account must exist");
        (liquid.0, staked.0, unstaking.0)
    }

    /// Current tally for a producer, in raw units.
    pub fn tally(&self, producer: &str) -> u64 {
        self.state.tally(&producer.into()).0
    }

    /// Whether a producer is in the current active set.
    pub fn is_active(&self, producer: &str) -> bool {
        self.state.global_properties().is_active(&producer.into())
    }
}

impl Default for TestChain {
    fn default() -> Self {
        Self::new()
    }
}

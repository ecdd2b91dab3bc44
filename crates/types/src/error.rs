//! Errors produced by the state-transition core.

use crate::{AccountName, Amount, TxId};
use thiserror::Error;

/// Classification of a [`ChainError`].
///
/// Every error is local to the offending transaction: the transaction is
/// rejected with zero effect on state and the driver keeps going. Nothing in
/// the core is fatal to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A business rule was violated: insufficient balance, cooldown still
    /// running, proxy target not accepting, and so on.
    Precondition,
    /// The request itself is malformed: missing notification party,
    /// duplicate transaction, inconsistent genesis.
    Validation,
}

/// Everything that can go wrong while applying an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("account {name} does not exist")]
    UnknownAccount { name: AccountName },

    #[error("account {name} already exists")]
    AccountAlreadyExists { name: AccountName },

    #[error("{account} has {available} liquid, needs {requested}")]
    InsufficientLiquidBalance {
        account: AccountName,
        available: Amount,
        requested: Amount,
    },

    #[error("{account} has {available} staked (incl. unstaking), cannot begin unstaking {requested}")]
    InsufficientStakedBalance {
        account: AccountName,
        available: Amount,
        requested: Amount,
    },

    #[error("{account} has {unstaking} unstaking, cannot withdraw {requested}")]
    UnstakeExceedsPool {
        account: AccountName,
        unstaking: Amount,
        requested: Amount,
    },

    #[error("unstaking cooldown for {account} has {remaining_slots} slots remaining")]
    CooldownActive {
        account: AccountName,
        remaining_slots: u64,
    },

    #[error("proxy {proxy} is not accepting proxied votes")]
    ProxyNotAccepting { proxy: AccountName },

    #[error("{account} cannot proxy to itself")]
    ProxyToSelf { account: AccountName },

    #[error("producer {name} is not registered")]
    UnknownProducer { name: AccountName },

    #[error("producer {name} is already registered")]
    ProducerAlreadyExists { name: AccountName },

    #[error("{account} already approves producer {producer}")]
    DuplicateApproval {
        account: AccountName,
        producer: AccountName,
    },

    #[error("{account} does not approve producer {producer}")]
    ApprovalNotFound {
        account: AccountName,
        producer: AccountName,
    },

    #[error("transaction {id} was already applied")]
    DuplicateTransaction { id: TxId },

    #[error("transfer recipient {recipient} missing from the notify set")]
    MissingNotify { recipient: AccountName },

    #[error("invalid genesis: {reason}")]
    InvalidGenesis { reason: String },
}

impl ChainError {
    /// Which of the two error classes this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChainError::UnknownAccount { .. }
            | ChainError::AccountAlreadyExists { .. }
            | ChainError::InsufficientLiquidBalance { .. }
            | ChainError::InsufficientStakedBalance { .. }
            | ChainError::UnstakeExceedsPool { .. }
            | ChainError::CooldownActive { .. }
            | ChainError::ProxyNotAccepting { .. }
            | ChainError::ProxyToSelf { .. }
            | ChainError::UnknownProducer { .. }
            | ChainError::ProducerAlreadyExists { .. }
            | ChainError::DuplicateApproval { .. }
            | ChainError::ApprovalNotFound { .. } => ErrorKind::Precondition,

            ChainError::DuplicateTransaction { .. }
            | ChainError::MissingNotify { .. }
            | ChainError::InvalidGenesis { .. } => ErrorKind::Validation,
        }
    }
}

//! Operation kinds and the transaction envelope.

use spindle_types::{
    AccountName, Amount, BlockchainConfiguration, ChainError, PublicKey, TxId,
};

/// The closed set of state-transition kinds.
///
/// Operations are **passive data** — they describe a requested mutation. The
/// chain state applies them via exhaustive matching; adding a kind is a
/// compile-visible change everywhere it matters. Authorization is resolved by
/// the driver before an operation reaches the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Open a new account funded from the creator's liquid balance.
    CreateAccount {
        creator: AccountName,
        name: AccountName,
        deposit: Amount,
    },

    /// Move liquid funds. The recipient must appear in the transaction's
    /// notify set.
    Transfer {
        from: AccountName,
        to: AccountName,
        amount: Amount,
    },

    /// Move liquid funds into the staked pool.
    Stake { account: AccountName, amount: Amount },

    /// Start (or restart) unstaking; supersedes any outstanding request.
    BeginUnstake { account: AccountName, amount: Amount },

    /// Withdraw matured unstaking funds to liquid.
    FinishUnstake { account: AccountName, amount: Amount },

    /// Route the account's vote weight through a proxy (None clears it).
    SetProxy {
        account: AccountName,
        proxy: Option<AccountName>,
    },

    /// Toggle whether the account accepts proxied votes.
    AllowProxying { account: AccountName, enabled: bool },

    /// Add or remove a producer in the effective voter's approval set.
    ApproveProducer {
        account: AccountName,
        producer: AccountName,
        approve: bool,
    },

    /// Register the owning account as a producer candidate.
    RegisterProducer {
        owner: AccountName,
        signing_key: PublicKey,
        preferences: BlockchainConfiguration,
    },

    /// Re-key a producer and optionally replace its configuration preference.
    UpdateProducer {
        owner: AccountName,
        signing_key: PublicKey,
        preferences: Option<BlockchainConfiguration>,
    },
}

impl Operation {
    /// Operation kind name for log lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            Operation::CreateAccount { .. } => "CreateAccount",
            Operation::Transfer { .. } => "Transfer",
            Operation::Stake { .. } => "Stake",
            Operation::BeginUnstake { .. } => "BeginUnstake",
            Operation::FinishUnstake { .. } => "FinishUnstake",
            Operation::SetProxy { .. } => "SetProxy",
            Operation::AllowProxying { .. } => "AllowProxying",
            Operation::ApproveProducer { .. } => "ApproveProducer",
            Operation::RegisterProducer { .. } => "RegisterProducer",
            Operation::UpdateProducer { .. } => "UpdateProducer",
        }
    }
}

/// One authorized operation plus its envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Identity for duplicate rejection, derived from the signed payload by
    /// the driver.
    pub id: TxId,
    /// The requested mutation.
    pub operation: Operation,
    /// Accounts the driver notifies of this transaction. The core only
    /// checks the rules below; delivery is the driver's business.
    pub notify: Vec<AccountName>,
}

impl Transaction {
    /// Build a transaction with an empty notify set.
    pub fn new(id: TxId, operation: Operation) -> Self {
        Self {
            id,
            operation,
            notify: Vec::new(),
        }
    }

    /// Add notify parties.
    pub fn with_notify(mut self, notify: Vec<AccountName>) -> Self {
        self.notify = notify;
        self
    }

    /// Structural validation, before any state is consulted.
    ///
    /// A transfer must notify its recipient; everything else carries no
    /// notify requirement.
    pub fn validate_structure(&self) -> Result<(), ChainError> {
        if let Operation::Transfer { to, .. } = &self.operation {
            if !self.notify.contains(to) {
                return Err(ChainError::MissingNotify {
                    recipient: to.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> AccountName {
        AccountName::from(s)
    }

    fn id(byte: u8) -> TxId {
        TxId::from_bytes([byte; 32])
    }

    #[test]
    fn test_transfer_requires_recipient_in_notify() {
        let tx = Transaction::new(
            id(1),
            Operation::Transfer {
                from: name("init1"),
                to: name("init2"),
                amount: Amount(100),
            },
        );
        let err = tx.validate_structure().unwrap_err();
        assert_eq!(err, ChainError::MissingNotify { recipient: name("init2") });

        let tx = tx.with_notify(vec![name("init2")]);
        assert!(tx.validate_structure().is_ok());
    }

    #[test]
    fn test_non_transfer_needs_no_notify() {
        let tx = Transaction::new(
            id(2),
            Operation::Stake {
                account: name("sam"),
                amount: Amount(55),
            },
        );
        assert!(tx.validate_structure().is_ok());
    }
}

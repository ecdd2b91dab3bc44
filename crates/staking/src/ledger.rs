//! Per-account balance pools.

use spindle_types::{AccountName, Amount, ChainError, Slot};
use std::collections::BTreeMap;

/// One account's balances.
///
/// `liquid + staked + unstaking` is conserved by every staking operation;
/// only transfers and account creation move value between accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    /// Freely transferable funds.
    pub liquid: Amount,
    /// Funds backing votes.
    pub staked: Amount,
    /// Funds mid-cooldown on their way back to liquid.
    pub unstaking: Amount,
    /// Slot at which the current cooldown began. None while `unstaking` is
    /// zero; partial withdrawals keep the original value.
    pub unstake_started_at: Option<Slot>,
}

impl Account {
    /// Sum of all three pools.
    pub fn total(&self) -> Amount {
        self.liquid
            .saturating_add(self.staked)
            .saturating_add(self.unstaking)
    }

    /// `(liquid, staked, unstaking)`.
    pub fn balance_triplet(&self) -> (Amount, Amount, Amount) {
        (self.liquid, self.staked, self.unstaking)
    }
}

/// The stake ledger: every account's balance pools.
///
/// Operations validate every precondition before mutating anything, so a
/// failed operation leaves the ledger untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StakeLedger {
    accounts: BTreeMap<AccountName, Account>,
}

impl StakeLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an account.
    pub fn account(&self, name: &AccountName) -> Result<&Account, ChainError> {
        self.accounts
            .get(name)
            .ok_or_else(|| ChainError::UnknownAccount { name: name.clone() })
    }

    /// Whether an account exists.
    pub fn contains(&self, name: &AccountName) -> bool {
        self.accounts.contains_key(name)
    }

    /// Iterate accounts in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountName, &Account)> {
        self.accounts.iter()
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the ledger has no accounts.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Open an account seeded with liquid funds out of thin air.
    ///
    /// Genesis only; every later creation goes through [`Self::open_funded`]
    /// so supply stays conserved.
    pub fn open_genesis(&mut self, name: AccountName, liquid: Amount) -> Result<(), ChainError> {
        if self.accounts.contains_key(&name) {
            return Err(ChainError::AccountAlreadyExists { name });
        }
        self.accounts.insert(
            name,
            Account {
                liquid,
                ..Account::default()
            },
        );
        Ok(())
    }

    /// Open an account funded by a transfer from the creator's liquid pool.
    pub fn open_funded(
        &mut self,
        creator: &AccountName,
        name: AccountName,
        deposit: Amount,
    ) -> Result<(), ChainError> {
        if self.accounts.contains_key(&name) {
            return Err(ChainError::AccountAlreadyExists { name });
        }
        let creator_liquid = self.account(creator)?.liquid;
        if deposit > creator_liquid {
            return Err(ChainError::InsufficientLiquidBalance {
                account: creator.clone(),
                available: creator_liquid,
                requested: deposit,
            });
        }
        // Validated; mutate both sides.
        if let Some(from) = self.accounts.get_mut(creator) {
            from.liquid = from.liquid.saturating_sub(deposit);
        }
        self.accounts.insert(
            name,
            Account {
                liquid: deposit,
                ..Account::default()
            },
        );
        Ok(())
    }

    /// Move liquid funds between accounts.
    pub fn transfer(
        &mut self,
        from: &AccountName,
        to: &AccountName,
        amount: Amount,
    ) -> Result<(), ChainError> {
        let from_liquid = self.account(from)?.liquid;
        self.account(to)?;
        if amount > from_liquid {
            return Err(ChainError::InsufficientLiquidBalance {
                account: from.clone(),
                available: from_liquid,
                requested: amount,
            });
        }
        if let Some(sender) = self.accounts.get_mut(from) {
            sender.liquid = sender.liquid.saturating_sub(amount);
        }
        if let Some(recipient) = self.accounts.get_mut(to) {
            recipient.liquid = recipient.liquid.saturating_add(amount);
        }
        Ok(())
    }

    /// Move liquid funds into the staked pool.
    pub fn stake(&mut self, name: &AccountName, amount: Amount) -> Result<(), ChainError> {
        let account = self.account(name)?;
        if amount > account.liquid {
            return Err(ChainError::InsufficientLiquidBalance {
                account: name.clone(),
                available: account.liquid,
                requested: amount,
            });
        }
        if let Some(account) = self.accounts.get_mut(name) {
            account.liquid = account.liquid.saturating_sub(amount);
            account.staked = account.staked.saturating_add(amount);
        }
        Ok(())
    }

    /// Start (or restart) unstaking.
    ///
    /// Any amount already mid-cooldown is first folded back into the staked
    /// pool, then exactly `amount` is moved out and the cooldown restarted: a
    /// new request supersedes the old one, it never stacks on top of it.
    /// `begin_unstake(0)` therefore cancels an outstanding request.
    pub fn begin_unstake(
        &mut self,
        name: &AccountName,
        amount: Amount,
        now: Slot,
    ) -> Result<(), ChainError> {
        let account = self.account(name)?;
        let available = account.staked.saturating_add(account.unstaking);
        if amount > available {
            return Err(ChainError::InsufficientStakedBalance {
                account: name.clone(),
                available,
                requested: amount,
            });
        }
        if let Some(account) = self.accounts.get_mut(name) {
            account.staked = available.saturating_sub(amount);
            account.unstaking = amount;
            account.unstake_started_at = if amount.is_zero() { None } else { Some(now) };
        }
        Ok(())
    }

    /// Withdraw matured unstaking funds to liquid.
    ///
    /// Partial withdrawals keep the original cooldown start, so the remainder
    /// can be withdrawn at any later time without waiting again.
    pub fn finish_unstake(
        &mut self,
        name: &AccountName,
        amount: Amount,
        now: Slot,
        cooldown_slots: u64,
    ) -> Result<(), ChainError> {
        let account = self.account(name)?;
        if amount > account.unstaking {
            return Err(ChainError::UnstakeExceedsPool {
                account: name.clone(),
                unstaking: account.unstaking,
                requested: amount,
            });
        }
        if amount.is_zero() {
            return Ok(());
        }
        if let Some(started) = account.unstake_started_at {
            let elapsed = now.elapsed_since(started);
            if elapsed < cooldown_slots {
                return Err(ChainError::CooldownActive {
                    account: name.clone(),
                    remaining_slots: cooldown_slots - elapsed,
                });
            }
        }
        if let Some(account) = self.accounts.get_mut(name) {
            account.unstaking = account.unstaking.saturating_sub(amount);
            account.liquid = account.liquid.saturating_add(amount);
            if account.unstaking.is_zero() {
                account.unstake_started_at = None;
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

    fn ledger_with(s: &str, liquid: u64) -> StakeLedger {
        let mut ledger = StakeLedger::new();
        ledger.open_genesis(name(s), Amount(liquid)).unwrap();
        ledger
    }

    #[test]
    fn test_stake_moves_liquid_to_staked() {
        let mut ledger = ledger_with("sam", 100);
        ledger.stake(&name("sam"), Amount(55)).unwrap();
        assert_eq!(
            ledger.account(&name("sam")).unwrap().balance_triplet(),
            (Amount(45), Amount(55), Amount(0))
        );
    }

    #[test]
    fn test_stake_rejects_overdraft() {
        let mut ledger = ledger_with("sam", 100);
        ledger.stake(&name("sam"), Amount(55)).unwrap();
        let err = ledger.stake(&name("sam"), Amount(46)).unwrap_err();
        assert!(matches!(err, ChainError::InsufficientLiquidBalance { .. }));
        // Nothing changed.
        assert_eq!(
            ledger.account(&name("sam")).unwrap().balance_triplet(),
            (Amount(45), Amount(55), Amount(0))
        );
    }

    #[test]
    fn test_begin_unstake_supersedes_prior_request() {
        let mut ledger = ledger_with("sam", 100);
        ledger.stake(&name("sam"), Amount(55)).unwrap();
        ledger.begin_unstake(&name("sam"), Amount(20), Slot(10)).unwrap();
        assert_eq!(
            ledger.account(&name("sam")).unwrap().balance_triplet(),
            (Amount(45), Amount(35), Amount(20))
        );

        // Re-beginning folds the 20 back before carving out 5.
        ledger.begin_unstake(&name("sam"), Amount(5), Slot(11)).unwrap();
        let account = ledger.account(&name("sam")).unwrap();
        assert_eq!(account.balance_triplet(), (Amount(45), Amount(50), Amount(5)));
        assert_eq!(account.unstake_started_at, Some(Slot(11)));
    }

    #[test]
    fn test_begin_unstake_zero_cancels() {
        let mut ledger = ledger_with("sam", 100);
        ledger.stake(&name("sam"), Amount(55)).unwrap();
        ledger.begin_unstake(&name("sam"), Amount(20), Slot(10)).unwrap();
        ledger.begin_unstake(&name("sam"), Amount(0), Slot(12)).unwrap();
        let account = ledger.account(&name("sam")).unwrap();
        assert_eq!(account.balance_triplet(), (Amount(45), Amount(55), Amount(0)));
        assert_eq!(account.unstake_started_at, None);
    }

    #[test]
    fn test_finish_unstake_gated_by_cooldown() {
        let mut ledger = ledger_with("sam", 100);
        ledger.stake(&name("sam"), Amount(55)).unwrap();
        ledger.begin_unstake(&name("sam"), Amount(20), Slot(10)).unwrap();

        let err = ledger
            .finish_unstake(&name("sam"), Amount(10), Slot(15), 100)
            .unwrap_err();
        assert_eq!(
            err,
            ChainError::CooldownActive {
                account: name("sam"),
                remaining_slots: 95,
            }
        );

        ledger
            .finish_unstake(&name("sam"), Amount(10), Slot(110), 100)
            .unwrap();
        assert_eq!(
            ledger.account(&name("sam")).unwrap().balance_triplet(),
            (Amount(55), Amount(35), Amount(10))
        );
    }

    #[test]
    fn test_partial_withdrawal_keeps_cooldown_start() {
        let mut ledger = ledger_with("sam", 100);
        ledger.stake(&name("sam"), Amount(55)).unwrap();
        ledger.begin_unstake(&name("sam"), Amount(20), Slot(10)).unwrap();
        ledger
            .finish_unstake(&name("sam"), Amount(10), Slot(110), 100)
            .unwrap();
        let account = ledger.account(&name("sam")).unwrap();
        assert_eq!(account.unstake_started_at, Some(Slot(10)));

        // The remainder matured long ago; withdrawing it immediately is fine.
        ledger
            .finish_unstake(&name("sam"), Amount(10), Slot(111), 100)
            .unwrap();
        let account = ledger.account(&name("sam")).unwrap();
        assert_eq!(account.balance_triplet(), (Amount(65), Amount(35), Amount(0)));
        assert_eq!(account.unstake_started_at, None);
    }

    #[test]
    fn test_finish_unstake_rejects_overdraw_even_after_cooldown() {
        let mut ledger = ledger_with("sam", 100);
        ledger.stake(&name("sam"), Amount(55)).unwrap();
        ledger.begin_unstake(&name("sam"), Amount(20), Slot(10)).unwrap();
        let err = ledger
            .finish_unstake(&name("sam"), Amount(21), Slot(1000), 100)
            .unwrap_err();
        assert!(matches!(err, ChainError::UnstakeExceedsPool { .. }));
    }

    #[test]
    fn test_transfer_conserves_total() {
        let mut ledger = ledger_with("a", 100);
        ledger.open_genesis(name("b"), Amount(50)).unwrap();
        ledger.transfer(&name("a"), &name("b"), Amount(30)).unwrap();
        assert_eq!(ledger.account(&name("a")).unwrap().liquid, Amount(70));
        assert_eq!(ledger.account(&name("b")).unwrap().liquid, Amount(80));

        let err = ledger.transfer(&name("a"), &name("b"), Amount(71)).unwrap_err();
        assert!(matches!(err, ChainError::InsufficientLiquidBalance { .. }));
    }

    #[test]
    fn test_open_funded_debits_creator() {
        let mut ledger = ledger_with("creator", 100);
        ledger
            .open_funded(&name("creator"), name("joe"), Amount(40))
            .unwrap();
        assert_eq!(ledger.account(&name("creator")).unwrap().liquid, Amount(60));
        assert_eq!(ledger.account(&name("joe")).unwrap().liquid, Amount(40));

        let err = ledger
            .open_funded(&name("creator"), name("joe"), Amount(1))
            .unwrap_err();
        assert!(matches!(err, ChainError::AccountAlreadyExists { .. }));
    }
}

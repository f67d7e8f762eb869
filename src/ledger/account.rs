//! Account balance bookkeeping

use std::collections::HashMap;

use crate::types::*;

/// Balance map for every account that has ever held funds.
///
/// The whole supply is assigned to a single holder at construction and only
/// moves afterwards, so the sum of balances always equals `total_supply`.
#[derive(Debug, Clone)]
pub struct AccountLedger {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl AccountLedger {
    /// Create a ledger with `total_supply` held entirely by `holder`
    pub fn new(holder: Address, total_supply: Amount) -> Self {
        let mut balances = HashMap::new();
        balances.insert(holder, total_supply);
        Self {
            balances,
            total_supply,
        }
    }

    /// Fixed supply issued at construction
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Balance of an account; unknown accounts hold zero
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    /// Decrease an account's balance.
    ///
    /// Leaves the balance untouched when `amount` exceeds it.
    pub fn debit(&mut self, account: &Address, amount: Amount) -> LedgerResult<()> {
        let available = self.balance_of(account);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: *account,
                available,
                requested: amount,
            })?;

        self.balances.insert(*account, remaining);
        Ok(())
    }

    /// Increase an account's balance
    pub fn credit(&mut self, account: &Address, amount: Amount) -> LedgerResult<()> {
        let current = self.balance_of(account);
        let updated = current.checked_add(amount).ok_or_else(|| {
            LedgerError::ArithmeticOverflow(format!(
                "crediting {amount} to {account} holding {current}"
            ))
        })?;

        self.balances.insert(*account, updated);
        Ok(())
    }

    /// Every tracked account, including ones drained to zero
    pub fn balances(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    /// Accounts currently holding a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|b| !b.is_zero()).count()
    }

    /// Sum of all balances, or `None` if the sum itself overflows
    pub fn sum_of_balances(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(Amount::ZERO, |acc, b| acc.checked_add(*b))
    }
}

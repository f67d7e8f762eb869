//! Delegated-spending allowances

use std::collections::HashMap;

use crate::types::*;

/// Remaining spend each spender may move out of each owner's account.
///
/// Entries are never removed; an allowance spent down to zero reads the same
/// as one that was never granted.
#[derive(Debug, Clone, Default)]
pub struct AllowanceRegistry {
    allowances: HashMap<(Address, Address), Amount>,
}

impl AllowanceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining allowance of `spender` over `owner`'s funds
    pub fn allowance_of(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Overwrite the allowance. Successive calls do not accumulate.
    pub fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances.insert((*owner, *spender), amount);
    }

    /// Spend `amount` of the allowance, returning what is left
    pub fn consume(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> LedgerResult<Amount> {
        let available = self.allowance_of(owner, spender);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                owner: *owner,
                spender: *spender,
                available,
                requested: amount,
            })?;

        self.set_allowance(owner, spender, remaining);
        Ok(remaining)
    }

    /// Raise the allowance by `added`, returning the new value
    pub fn increase(
        &mut self,
        owner: &Address,
        spender: &Address,
        added: Amount,
    ) -> LedgerResult<Amount> {
        let current = self.allowance_of(owner, spender);
        let updated = current.checked_add(added).ok_or_else(|| {
            LedgerError::ArithmeticOverflow(format!(
                "raising allowance of {spender} over {owner} from {current} by {added}"
            ))
        })?;

        self.set_allowance(owner, spender, updated);
        Ok(updated)
    }

    /// Lower the allowance by `subtracted`, returning the new value
    pub fn decrease(
        &mut self,
        owner: &Address,
        spender: &Address,
        subtracted: Amount,
    ) -> LedgerResult<Amount> {
        // Same failure as spending more than is allowed
        self.consume(owner, spender, subtracted)
    }

    /// Every recorded `(owner, spender)` entry
    pub fn entries(&self) -> impl Iterator<Item = (&(Address, Address), &Amount)> {
        self.allowances.iter()
    }
}

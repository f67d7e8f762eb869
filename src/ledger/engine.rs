//! Execution of transfers and approvals

use tracing::error;

use crate::ledger::{AccountLedger, AllowanceRegistry};
use crate::types::*;
use crate::utils::validation;

/// Coordinates balance movement with allowance bookkeeping.
///
/// Borrows both maps mutably for the duration of one operation. Amounts have
/// already passed the boundary validator. Each method either applies its
/// whole mutation or leaves both maps exactly as it found them, and on
/// success returns the event to publish.
pub struct TransferEngine<'a> {
    accounts: &'a mut AccountLedger,
    allowances: &'a mut AllowanceRegistry,
}

impl<'a> TransferEngine<'a> {
    /// Create an engine over the given state
    pub fn new(accounts: &'a mut AccountLedger, allowances: &'a mut AllowanceRegistry) -> Self {
        Self {
            accounts,
            allowances,
        }
    }

    /// Move `amount` from `caller` to `to`
    pub fn transfer(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<EventKind> {
        validation::validate_recipient(to)?;

        self.move_balance(caller, to, amount)?;

        Ok(EventKind::Transfer {
            from: *caller,
            to: *to,
            amount,
        })
    }

    /// Set `spender`'s allowance over `caller`'s funds to exactly `amount`
    pub fn approve(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: Amount,
    ) -> LedgerResult<EventKind> {
        self.allowances.set_allowance(caller, spender, amount);

        Ok(EventKind::Approval {
            owner: *caller,
            spender: *spender,
            amount,
        })
    }

    /// Move `amount` from `from` to `to`, spending `caller`'s allowance
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<EventKind> {
        validation::validate_recipient(to)?;

        let previous = self.allowances.allowance_of(from, caller);
        self.allowances.consume(from, caller, amount)?;

        if let Err(err) = self.move_balance(from, to, amount) {
            self.allowances.set_allowance(from, caller, previous);
            return Err(err);
        }

        Ok(EventKind::Transfer {
            from: *from,
            to: *to,
            amount,
        })
    }

    /// Raise `spender`'s allowance over `caller`'s funds by `added`
    pub fn increase_allowance(
        &mut self,
        caller: &Address,
        spender: &Address,
        added: Amount,
    ) -> LedgerResult<EventKind> {
        let amount = self.allowances.increase(caller, spender, added)?;

        Ok(EventKind::Approval {
            owner: *caller,
            spender: *spender,
            amount,
        })
    }

    /// Lower `spender`'s allowance over `caller`'s funds by `subtracted`
    pub fn decrease_allowance(
        &mut self,
        caller: &Address,
        spender: &Address,
        subtracted: Amount,
    ) -> LedgerResult<EventKind> {
        let amount = self.allowances.decrease(caller, spender, subtracted)?;

        Ok(EventKind::Approval {
            owner: *caller,
            spender: *spender,
            amount,
        })
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> LedgerResult<()> {
        self.accounts.debit(from, amount)?;

        if let Err(err) = self.accounts.credit(to, amount) {
            error!(%from, %to, %amount, error = %err, "credit overflowed, reverting debit");
            // Restores the pre-debit balance, which was representable
            self.accounts.credit(from, amount)?;
            return Err(err);
        }

        Ok(())
    }
}

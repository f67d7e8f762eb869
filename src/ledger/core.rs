//! Token ledger orchestrator exposing the public operation surface

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::TokenConfig;
use crate::ledger::{AccountLedger, AllowanceRegistry, TransferEngine};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation;

struct LedgerState {
    accounts: AccountLedger,
    allowances: AllowanceRegistry,
}

/// Fixed-supply fungible token.
///
/// All state sits behind one read/write lock: mutations are serialized
/// against each other, and readers never see a half-applied operation.
/// Arguments are validated before the lock is taken. Events are emitted
/// after the state lock is released, in the order their mutations committed.
pub struct Token {
    metadata: TokenMetadata,
    state: RwLock<LedgerState>,
    validator: Box<dyn TransferValidator>,
    sink: Arc<dyn EventSink>,
    emit_sequence: Mutex<()>,
}

impl Token {
    /// Issue `total_supply` to `initial_holder`.
    ///
    /// The issuance is published as a transfer from the null identity.
    pub fn new(
        metadata: TokenMetadata,
        initial_holder: Address,
        total_supply: Amount,
        sink: Arc<dyn EventSink>,
    ) -> LedgerResult<Self> {
        validation::validate_recipient(&initial_holder)?;

        let token = Self {
            metadata,
            state: RwLock::new(LedgerState {
                accounts: AccountLedger::new(initial_holder, total_supply),
                allowances: AllowanceRegistry::new(),
            }),
            validator: Box::new(DefaultTransferValidator),
            sink,
            emit_sequence: Mutex::new(()),
        };

        debug!(
            name = %token.metadata.name,
            symbol = %token.metadata.symbol,
            holder = %initial_holder,
            supply = %total_supply,
            "token issued"
        );
        token
            .sink
            .emit(&LedgerEvent::transfer(Address::ZERO, initial_holder, total_supply));

        Ok(token)
    }

    /// Create a token from validated configuration
    pub fn from_config(config: &TokenConfig, sink: Arc<dyn EventSink>) -> LedgerResult<Self> {
        config.validate()?;
        Self::new(
            config.metadata(),
            config.initial_holder,
            config.resolved_supply()?,
            sink,
        )
    }

    /// Replace the boundary validator
    pub fn with_validator(mut self, validator: Box<dyn TransferValidator>) -> Self {
        self.validator = validator;
        self
    }

    // Metadata
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    // Queries
    /// Fixed supply issued at construction
    pub fn total_supply(&self) -> Amount {
        self.state.read().accounts.total_supply()
    }

    /// Balance of an account; zero if it never held funds
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.state.read().accounts.balance_of(account)
    }

    /// Remaining amount `spender` may move out of `owner`'s account
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.state.read().allowances.allowance_of(owner, spender)
    }

    /// Accounts with a non-zero balance, in address order
    pub fn holders(&self) -> Vec<(Address, Amount)> {
        let state = self.state.read();
        let mut holders: Vec<(Address, Amount)> = state
            .accounts
            .balances()
            .filter(|(_, balance)| !balance.is_zero())
            .map(|(account, balance)| (*account, *balance))
            .collect();
        holders.sort_by_key(|(account, _)| *account);
        holders
    }

    // Mutations
    /// Move `amount` of `caller`'s funds to `to`
    pub fn transfer(
        &self,
        caller: &Address,
        to: &Address,
        amount: &BigDecimal,
    ) -> LedgerResult<bool> {
        self.execute(
            "transfer",
            || self.checked_transfer_amount(to, amount),
            |engine, amount| engine.transfer(caller, to, amount),
        )
    }

    /// Set `spender`'s allowance over `caller`'s funds, replacing any previous value
    pub fn approve(
        &self,
        caller: &Address,
        spender: &Address,
        amount: &BigDecimal,
    ) -> LedgerResult<bool> {
        self.execute(
            "approve",
            || self.validator.validate_amount(amount),
            |engine, amount| engine.approve(caller, spender, amount),
        )
    }

    /// Move `amount` from `from` to `to` on the strength of `caller`'s allowance
    pub fn transfer_from(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: &BigDecimal,
    ) -> LedgerResult<bool> {
        self.execute(
            "transfer_from",
            || self.checked_transfer_amount(to, amount),
            |engine, amount| engine.transfer_from(caller, from, to, amount),
        )
    }

    /// Raise `spender`'s allowance over `caller`'s funds
    pub fn increase_allowance(
        &self,
        caller: &Address,
        spender: &Address,
        added: &BigDecimal,
    ) -> LedgerResult<bool> {
        self.execute(
            "increase_allowance",
            || self.validator.validate_amount(added),
            |engine, added| engine.increase_allowance(caller, spender, added),
        )
    }

    /// Lower `spender`'s allowance over `caller`'s funds
    pub fn decrease_allowance(
        &self,
        caller: &Address,
        spender: &Address,
        subtracted: &BigDecimal,
    ) -> LedgerResult<bool> {
        self.execute(
            "decrease_allowance",
            || self.validator.validate_amount(subtracted),
            |engine, subtracted| engine.decrease_allowance(caller, spender, subtracted),
        )
    }

    fn checked_transfer_amount(&self, to: &Address, amount: &BigDecimal) -> LedgerResult<Amount> {
        self.validator.validate_recipient(to)?;
        self.validator.validate_amount(amount)
    }

    fn execute<P, F>(&self, operation: &'static str, prepare: P, apply: F) -> LedgerResult<bool>
    where
        P: FnOnce() -> LedgerResult<Amount>,
        F: FnOnce(&mut TransferEngine<'_>, Amount) -> LedgerResult<EventKind>,
    {
        let outcome = prepare().and_then(|amount| {
            let mut guard = self.state.write();
            let LedgerState {
                accounts,
                allowances,
            } = &mut *guard;
            let kind = apply(&mut TransferEngine::new(accounts, allowances), amount)?;
            // Taken before the state lock drops so the next commit emits after this one
            let sequence = self.emit_sequence.lock();
            Ok((kind, sequence))
        });

        match outcome {
            Ok((kind, sequence)) => {
                debug!(operation, event = ?kind, "ledger mutation committed");
                self.sink.emit(&LedgerEvent::new(kind));
                drop(sequence);
                Ok(true)
            }
            Err(err) if err.is_fatal() => {
                error!(operation, error = %err, "ledger invariant violated");
                Err(err)
            }
            Err(err) => {
                warn!(operation, error = %err, "ledger operation rejected");
                Err(err)
            }
        }
    }

    // Reporting
    /// Consistent copy of the whole ledger
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read();

        let balances = state
            .accounts
            .balances()
            .map(|(account, balance)| (*account, *balance))
            .collect();

        let mut allowances: BTreeMap<Address, BTreeMap<Address, Amount>> = BTreeMap::new();
        for ((owner, spender), amount) in state.allowances.entries() {
            allowances
                .entry(*owner)
                .or_default()
                .insert(*spender, *amount);
        }

        LedgerSnapshot {
            metadata: self.metadata.clone(),
            total_supply: state.accounts.total_supply(),
            balances,
            allowances,
            taken_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Check that balances still add up to the issued supply
    pub fn validate_integrity(&self) -> LedgerIntegrityReport {
        let state = self.state.read();
        let total_supply = state.accounts.total_supply();
        let sum_of_balances = state.accounts.sum_of_balances();

        let mut issues = Vec::new();
        match sum_of_balances {
            Some(sum) if sum != total_supply => issues.push(format!(
                "Balances do not add up to total supply: balances = {sum}, supply = {total_supply}"
            )),
            Some(_) => {}
            None => issues.push("Sum of balances overflows the amount width".to_string()),
        }

        LedgerIntegrityReport {
            total_supply,
            sum_of_balances,
            holder_count: state.accounts.holder_count(),
            is_valid: issues.is_empty(),
            issues,
        }
    }
}

/// Point-in-time copy of every balance and allowance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub metadata: TokenMetadata,
    pub total_supply: Amount,
    pub balances: BTreeMap<Address, Amount>,
    pub allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    pub taken_at: NaiveDateTime,
}

/// Report on ledger integrity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerIntegrityReport {
    pub total_supply: Amount,
    pub sum_of_balances: Option<Amount>,
    pub holder_count: usize,
    pub is_valid: bool,
    pub issues: Vec<String>,
}

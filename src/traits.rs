//! Traits for event delivery and transfer validation

use bigdecimal::BigDecimal;

use crate::types::*;
use crate::utils::validation;

/// Receiver of ledger notifications.
///
/// Delivery is fire-and-forget: the mutation is already committed when
/// `emit` is called, so an implementation has no way to fail the operation.
/// Events from one token arrive one at a time and in the order their
/// mutations committed; the next writer waits until `emit` returns.
/// Implementations must not call back into the [`Token`](crate::ledger::Token)
/// that is emitting.
pub trait EventSink: Send + Sync {
    /// Deliver one event
    fn emit(&self, event: &LedgerEvent);
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &LedgerEvent) {}
}

/// Trait for implementing custom parameter validation at the ledger boundary
pub trait TransferValidator: Send + Sync {
    /// Validate the destination of a transfer
    fn validate_recipient(&self, recipient: &Address) -> LedgerResult<()>;

    /// Turn a caller-supplied quantity into a ledger amount
    fn validate_amount(&self, amount: &BigDecimal) -> LedgerResult<Amount>;
}

/// Default validator: no transfers to the null identity, amounts must be
/// non-negative integers that fit the ledger's fixed width
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTransferValidator;

impl TransferValidator for DefaultTransferValidator {
    fn validate_recipient(&self, recipient: &Address) -> LedgerResult<()> {
        validation::validate_recipient(recipient)
    }

    fn validate_amount(&self, amount: &BigDecimal) -> LedgerResult<Amount> {
        validation::parse_amount(amount)
    }
}

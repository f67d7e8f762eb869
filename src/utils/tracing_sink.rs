//! Event sink that writes events to the `tracing` log

use tracing::info;

use crate::traits::*;
use crate::types::*;

/// Logs each event at `info` under the `token_ledger::events` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &LedgerEvent) {
        match &event.kind {
            EventKind::Transfer { from, to, amount } => info!(
                target: "token_ledger::events",
                id = %event.id,
                %from,
                %to,
                %amount,
                "Transfer"
            ),
            EventKind::Approval {
                owner,
                spender,
                amount,
            } => info!(
                target: "token_ledger::events",
                id = %event.id,
                %owner,
                %spender,
                %amount,
                "Approval"
            ),
        }
    }
}

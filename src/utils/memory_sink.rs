//! In-memory event sink for testing

use parking_lot::RwLock;
use std::sync::Arc;

use crate::traits::*;
use crate::types::*;

/// Records every emitted event, in emission order.
///
/// Clones share the same buffer, so a test can keep one handle and give the
/// other to the token.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventSink {
    events: Arc<RwLock<Vec<LedgerEvent>>>,
}

impl MemoryEventSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.read().clone()
    }

    /// Recorded event payloads without ids or timestamps
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.read().iter().map(|e| e.kind.clone()).collect()
    }

    /// Most recent event, if any
    pub fn last(&self) -> Option<LedgerEvent> {
        self.events.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Drop all recorded events
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: &LedgerEvent) {
        self.events.write().push(event.clone());
    }
}

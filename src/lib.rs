//! # Token Ledger
//!
//! A fixed-supply fungible token ledger: balances, spending allowances, and
//! delegated transfers, with the accounting invariants enforced on every
//! mutation.
//!
//! ## Features
//!
//! - **Fixed issuance**: the whole supply goes to one holder at creation; balances always sum to it
//! - **Transfers**: direct (`transfer`) and delegated (`transfer_from`), each applied atomically
//! - **Allowances**: overwrite-semantics `approve`, plus `increase_allowance` / `decrease_allowance`
//! - **Events**: `Transfer` and `Approval` notifications through a pluggable [`EventSink`]
//! - **Thread safety**: one `Token` can be shared across threads behind an `Arc`
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use bigdecimal::BigDecimal;
//! use token_ledger::{Address, Amount, NoopEventSink, Token, TokenMetadata};
//!
//! let owner = Address::from_low_u8(1);
//! let alice = Address::from_low_u8(2);
//! let token = Token::new(
//!     TokenMetadata::default(),
//!     owner,
//!     Amount::new(1_000),
//!     Arc::new(NoopEventSink),
//! )
//! .unwrap();
//!
//! token.transfer(&owner, &alice, &BigDecimal::from(100)).unwrap();
//! assert_eq!(token.balance_of(&alice), Amount::new(100));
//! ```
//!
//! ## Arithmetic overflow
//!
//! Balances cannot overflow while they sum to a representable total supply,
//! so [`LedgerError::ArithmeticOverflow`] signals broken accounting rather
//! than bad input. It is still returned as an error, never a panic, and the
//! failed operation is fully reverted. Callers should treat it as fatal
//! (see [`LedgerError::is_fatal`]).

pub mod config;
pub mod ledger;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use ledger::*;
pub use traits::*;
pub use types::*;

pub use utils::{MemoryEventSink, TracingEventSink};

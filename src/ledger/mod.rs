//! Ledger module containing balance, allowance and transfer processing

pub mod account;
pub mod allowance;
pub mod core;
pub mod engine;

pub use account::*;
pub use allowance::*;
pub use self::core::*;
pub use engine::*;

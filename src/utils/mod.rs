//! Utility modules

pub mod memory_sink;
pub mod tracing_sink;
pub mod validation;

pub use memory_sink::*;
pub use tracing_sink::*;
pub use validation::*;

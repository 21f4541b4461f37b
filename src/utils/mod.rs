//! Shared utilities.

mod bootstrap;

pub use bootstrap::init_tracing;

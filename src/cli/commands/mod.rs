//! CLI command implementations.

pub mod analyze;
pub mod classify;
pub mod deadlocks;

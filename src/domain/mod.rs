//! Domain layer for the flaky-test diagnostic engine
//!
//! Core models (runs, failure records, thread dumps, reports), errors and
//! ports. Nothing here touches the filesystem.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DiagnosticError, DiagnosticResult, LockRole, ParseWarning};

//! Infrastructure layer module
//!
//! Adapters behind the domain ports plus process-level concerns:
//! - Artifact sources (filesystem, in-memory)
//! - Configuration management
//! - Logging infrastructure

pub mod artifacts;
pub mod config;
pub mod logging;

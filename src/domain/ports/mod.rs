//! Port trait definitions (Hexagonal Architecture)
//!
//! - ArtifactSource: directory listing and file reads for run artifacts
//!
//! Infrastructure adapters implement these so the analysis stays independent
//! of where artifacts live.

pub mod artifact_source;

pub use artifact_source::{ArtifactEntry, ArtifactSource};

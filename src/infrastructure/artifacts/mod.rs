//! Artifact source adapters

pub mod fs;
pub mod in_memory;

pub use fs::FsArtifactSource;
pub use in_memory::InMemoryArtifactSource;

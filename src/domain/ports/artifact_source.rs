//! Artifact source port for reading completed run artifacts.
//!
//! Defines the directory-listing and file-read contract the run store and
//! diagnostic engine depend on, keeping the analysis itself free of direct
//! filesystem access.

use std::io;
use std::path::{Path, PathBuf};

/// One entry returned by [`ArtifactSource::list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// Final path component.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl ArtifactEntry {
    /// Lowercased extension of the entry, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Read-only access to run artifacts.
pub trait ArtifactSource {
    /// Whether `path` exists at all.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// List the direct children of a directory. Order is unspecified.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<ArtifactEntry>>;

    /// Read a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

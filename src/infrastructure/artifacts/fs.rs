//! Filesystem-backed artifact source.

use std::fs;
use std::io;
use std::path::Path;

use crate::domain::ports::{ArtifactEntry, ArtifactSource};

/// Reads artifacts straight from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactSource;

impl FsArtifactSource {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactSource for FsArtifactSource {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<ArtifactEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            entries.push(ArtifactEntry {
                path: entry.path(),
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: file_type.is_dir(),
            });
        }
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(path)?;
        // Build logs occasionally carry stray non-UTF-8 bytes from test output
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

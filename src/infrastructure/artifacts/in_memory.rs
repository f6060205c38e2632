//! In-memory artifact source for tests and embedding callers.
//!
//! Directories are implied by the files stored beneath them. A file can be
//! registered as unreadable to exercise read-failure paths.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::ports::{ArtifactEntry, ArtifactSource};

#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactSource {
    /// `None` marks a file that exists but fails to read
    files: BTreeMap<PathBuf, Option<String>>,
    dirs: BTreeSet<PathBuf>,
}

impl InMemoryArtifactSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an (empty) directory.
    #[must_use]
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.insert_dir(path.into());
        self
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let path = path.into();
        self.insert_parents(&path);
        self.files.insert(path, Some(contents.into()));
        self
    }

    #[must_use]
    pub fn with_unreadable_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.insert_parents(&path);
        self.files.insert(path, None);
        self
    }

    fn insert_dir(&mut self, path: PathBuf) {
        self.insert_parents(&path);
        self.dirs.insert(path);
    }

    fn insert_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl ArtifactSource for InMemoryArtifactSource {
    fn exists(&self, path: &Path) -> bool {
        self.dirs.contains(path) || self.files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<ArtifactEntry>> {
        if !self.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", path.display()),
            ));
        }

        let child = |p: &PathBuf, is_dir: bool| -> Option<ArtifactEntry> {
            (p.parent() == Some(path)).then(|| ArtifactEntry {
                path: p.clone(),
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                is_dir,
            })
        };

        Ok(self
            .dirs
            .iter()
            .filter_map(|d| child(d, true))
            .chain(self.files.keys().filter_map(|f| child(f, false)))
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        match self.files.get(path) {
            Some(Some(contents)) => Ok(contents.clone()),
            Some(None) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )),
        }
    }
}

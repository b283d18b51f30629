//! File store seam: does an uploaded file still exist on disk?

use std::path::{Path, PathBuf};

use desk_core::entities::FileMeta;

pub trait FileStore: Send + Sync {
    fn exists_on_disk(&self, file: &FileMeta) -> bool;
}

/// Files live under one upload directory; `FileMeta::path` is relative to it.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileStore for LocalFileStore {
    fn exists_on_disk(&self, file: &FileMeta) -> bool {
        self.root.join(&file.path).is_file()
    }
}

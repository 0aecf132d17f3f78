// Copyright 2025 Cornell University
// released under MIT License

use crate::errors::{BatchError, Result};
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory tree of circuit files.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
}

impl Corpus {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.is_dir() {
            Ok(Self { root })
        } else {
            Err(BatchError::MissingRoot(root))
        }
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Lazily walks the tree. Every call starts a new walk, so files created by an
    /// earlier pass are picked up. No particular order is guaranteed.
    pub fn files(&self) -> impl Iterator<Item = PathBuf> {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
    }
}

//! Drops modifications that left a file's bytes unchanged.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::types::{Change, ChangeKind};
use crate::utils::hash::ContentHash;

/// Last seen content hash per input file.
#[derive(Debug, Default)]
pub struct FreshnessFilter {
    seen: FxHashMap<PathBuf, ContentHash>,
}

impl FreshnessFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record current hashes without reporting anything.
    pub fn prime(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        for path in paths {
            if let Ok(hash) = ContentHash::of_file(&path) {
                self.seen.insert(path, hash);
            }
        }
    }

    /// Keep removals, creations and modifications whose hash moved.
    pub fn retain_changed(&mut self, changes: Vec<Change>) -> Vec<Change> {
        changes
            .into_iter()
            .filter(|change| self.is_changed(change))
            .collect()
    }

    fn is_changed(&mut self, change: &Change) -> bool {
        if change.kind == ChangeKind::Removed {
            self.seen.remove(&change.path);
            return true;
        }
        match ContentHash::of_file(&change.path) {
            Ok(hash) => {
                let previous = self.seen.insert(change.path.clone(), hash);
                change.kind == ChangeKind::Created || previous != Some(hash)
            }
            // Directories, or a file gone before we could read it
            Err(_) => true,
        }
    }
}

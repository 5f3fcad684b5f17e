//! Maps changed paths to the tasks that read them.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use super::types::Change;
use crate::task::{DirtySet, TaskGraph, TaskName};
use crate::utils::path::{normalize_path, relative_slash};

/// Routing decision for one debounced batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Routed {
    pub dirty: DirtySet,
    pub config_changed: bool,
}

/// Input patterns of every task, compiled once.
///
/// Patterns are matched against paths relative to the site root with `/`
/// separators. `*` stops at a separator, `**` does not. The config file is
/// an input of every task.
pub struct ChangeRouter {
    root: PathBuf,
    config_file: PathBuf,
    patterns: GlobSet,
    /// Owner of each pattern, by glob index
    owners: Vec<TaskName>,
    all: Vec<TaskName>,
}

impl ChangeRouter {
    pub fn new(graph: &TaskGraph, root: &Path, config_file: &Path) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        let mut owners = Vec::new();

        for task in graph.tasks() {
            for pattern in &task.inputs {
                builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
                owners.push(task.name.clone());
            }
        }

        Ok(Self {
            root: normalize_path(root),
            config_file: normalize_path(config_file),
            patterns: builder.build()?,
            owners,
            all: graph.tasks().map(|t| t.name.clone()).collect(),
        })
    }

    pub fn is_config(&self, path: &Path) -> bool {
        normalize_path(path) == self.config_file
    }

    /// Tasks that read `change.path`. Unmatched paths dirty nothing.
    pub fn route(&self, change: &Change) -> BTreeSet<TaskName> {
        if self.is_config(&change.path) {
            return self.all.iter().cloned().collect();
        }
        let Some(rel) = relative_slash(&normalize_path(&change.path), &self.root) else {
            return BTreeSet::new();
        };
        self.patterns
            .matches(&rel)
            .into_iter()
            .map(|i| self.owners[i].clone())
            .collect()
    }

    /// Union of the routes of a batch; each task appears once.
    pub fn route_batch(&self, changes: &[Change]) -> Routed {
        let mut routed = Routed::default();
        for change in changes {
            if self.is_config(&change.path) {
                routed.config_changed = true;
            }
            for name in self.route(change) {
                routed.dirty.insert(name);
            }
        }
        routed
    }

    /// Whether any task reads `path`.
    pub fn is_input(&self, path: &Path) -> bool {
        relative_slash(path, &self.root).is_some_and(|rel| self.patterns.is_match(rel))
    }
}

//! State shared by task actions within and across runs.

use std::{
    collections::BTreeSet,
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Result, anyhow};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use super::TaskName;
use crate::config::{ConfigHandle, SiteConfig};
use crate::content::RenderedSite;
use crate::core::CancelFlag;

/// Everything an action may read besides its input files.
///
/// The rendered site is published by the `content` task and read by the
/// tasks that come after it; it survives between incremental runs so a
/// feed-only rebuild sees the last successful render.
pub struct BuildContext {
    config: Arc<ConfigHandle>,
    site: RwLock<Option<Arc<RenderedSite>>>,
    /// Files each task wrote in its last successful run
    manifest: Mutex<FxHashMap<TaskName, BTreeSet<PathBuf>>>,
    cancel: CancelFlag,
}

impl BuildContext {
    pub fn new(config: Arc<ConfigHandle>, cancel: CancelFlag) -> Self {
        Self {
            config,
            site: RwLock::new(None),
            manifest: Mutex::new(FxHashMap::default()),
            cancel,
        }
    }

    /// Context over a fixed config with a private cancel flag.
    #[cfg(test)]
    pub fn for_config(config: SiteConfig) -> Self {
        let handle = ConfigHandle::new(config, crate::config::Overrides::default());
        Self::new(Arc::new(handle), CancelFlag::new())
    }

    /// Config snapshot; stays consistent for the caller even across reloads.
    pub fn config(&self) -> Arc<SiteConfig> {
        self.config.get()
    }

    pub fn config_handle(&self) -> &Arc<ConfigHandle> {
        &self.config
    }

    #[cfg(test)]
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn publish_site(&self, site: RenderedSite) {
        *self.site.write() = Some(Arc::new(site));
    }

    /// The last rendered site.
    pub fn site(&self) -> Result<Arc<RenderedSite>> {
        self.site
            .read()
            .clone()
            .ok_or_else(|| anyhow!("content has not been rendered in this session"))
    }

    /// Record what `task` wrote and return what it no longer writes.
    pub(super) fn replace_outputs(&self, task: &TaskName, written: &[PathBuf]) -> Vec<PathBuf> {
        let current: BTreeSet<PathBuf> = written.iter().cloned().collect();
        let previous = self
            .manifest
            .lock()
            .insert(task.clone(), current.clone())
            .unwrap_or_default();
        previous.difference(&current).cloned().collect()
    }
}

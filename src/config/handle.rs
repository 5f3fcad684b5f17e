//! Live configuration with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads and atomic replacement, so a
//! `kiln.toml` edit during watch mode swaps the config between two runs.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use super::{ConfigError, Overrides, SiteConfig};
use crate::utils::hash::ContentHash;

pub struct ConfigHandle {
    current: ArcSwap<SiteConfig>,
    overrides: Overrides,
    /// Hash of the file content the current config was parsed from
    hash: Mutex<Option<ContentHash>>,
}

impl ConfigHandle {
    pub fn new(config: SiteConfig, overrides: Overrides) -> Self {
        let hash = ContentHash::of_file(&config.config_path).ok();
        Self {
            current: ArcSwap::from_pointee(config),
            overrides,
            hash: Mutex::new(hash),
        }
    }

    #[inline]
    pub fn get(&self) -> Arc<SiteConfig> {
        self.current.load_full()
    }

    /// Reload from disk if the file content changed.
    ///
    /// Returns `Ok(true)` when a new config was installed. On error the
    /// previous config stays in place.
    pub fn reload(&self) -> Result<bool, ConfigError> {
        let path = self.get().config_path.clone();
        let new_hash =
            ContentHash::of_file(&path).map_err(|err| ConfigError::Io(path.clone(), err))?;

        let mut hash = self.hash.lock();
        if *hash == Some(new_hash) {
            return Ok(false);
        }

        let config = SiteConfig::load(&path, &self.overrides)?;
        self.current.store(Arc::new(config));
        *hash = Some(new_hash);
        Ok(true)
    }
}

//! File system actor.
//!
//! Watches the site sources and turns bursts of events into dirty sets.
//! The watcher starts before the initial build so nothing that changes
//! during it is lost.
//!
//! ```text
//! notify → Debouncer (timing) → FreshnessFilter (blake3) → ChangeRouter → BuildMsg
//! ```

mod debouncer;
mod freshness;
mod router;
mod types;
mod watch_roots;

#[cfg(test)]
mod tests;

pub use debouncer::Debouncer;
pub use freshness::FreshnessFilter;
pub use router::ChangeRouter;
#[cfg(test)]
pub use types::{Change, ChangeKind};

use std::path::PathBuf;
use std::time::{Duration, Instant};

use jwalk::WalkDir;
use notify::{RecommendedWatcher, RecursiveMode};
use tokio::sync::mpsc;

use super::messages::BuildMsg;
use crate::config::SiteConfig;
use crate::utils::path::normalize_path;
use watch_roots::WatchRoots;

const STARTUP_POLL: Duration = Duration::from_millis(100);

pub struct FsActor {
    /// Sync channel fed by the notify callback
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Must stay alive for events to flow
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    build_tx: mpsc::Sender<BuildMsg>,
    debouncer: Debouncer,
    freshness: FreshnessFilter,
    router: ChangeRouter,
}

impl FsActor {
    pub fn new(
        config: &SiteConfig,
        router: ChangeRouter,
        build_tx: mpsc::Sender<BuildMsg>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(watch_paths(config));
        watch_roots.attach_existing(&mut watcher)?;

        let mut freshness = FreshnessFilter::new();
        let inputs: Vec<PathBuf> = watch_roots
            .trees()
            .flat_map(|root| WalkDir::new(root).skip_hidden(true))
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| normalize_path(&entry.path()))
            .filter(|path| router.is_input(path))
            .collect();
        freshness.prime(inputs);
        freshness.prime([normalize_path(&config.config_path)]);

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            build_tx,
            debouncer: Debouncer::new().ignoring(normalize_path(&config.output_dir())),
            freshness,
            router,
        })
    }

    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            build_tx,
            mut debouncer,
            mut freshness,
            router,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify has no async API: bridge on a plain thread
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => {
                    debouncer.add_event(&event, Instant::now());
                }
                _ = tokio::time::sleep(next_wakeup(&debouncer)) => {
                    watch_roots.maintain(&mut watcher);
                    if crate::core::is_shutdown() {
                        debouncer.clear();
                        break;
                    }
                    let Some(msg) = process_changes(&mut debouncer, &mut freshness, &router) else {
                        continue;
                    };
                    if build_tx.send(msg).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Pending changes wait for the initial build at a slower poll.
fn next_wakeup(debouncer: &Debouncer) -> Duration {
    let wait = debouncer.sleep_duration(Instant::now());
    if crate::core::is_serving() {
        wait
    } else {
        wait.max(STARTUP_POLL)
    }
}

/// Turn a ready batch into a rebuild, or nothing when no task cares.
fn process_changes(
    debouncer: &mut Debouncer,
    freshness: &mut FreshnessFilter,
    router: &ChangeRouter,
) -> Option<BuildMsg> {
    // Hold events until the initial build has finished
    if !crate::core::is_serving() {
        return None;
    }

    let changes = freshness.retain_changed(debouncer.take_if_ready(Instant::now())?);
    for change in &changes {
        crate::debug!("watch"; "{}: {}", change.kind.label(), change.path.display());
    }

    let routed = router.route_batch(&changes);
    if routed.dirty.is_empty() {
        return None;
    }
    Some(BuildMsg::Rebuild {
        dirty: routed.dirty,
        config_changed: routed.config_changed,
        changed: changes.into_iter().map(|c| c.path).collect(),
    })
}

/// Site root (for `kiln.toml` and root files) plus every source tree.
fn watch_paths(config: &SiteConfig) -> Vec<(PathBuf, RecursiveMode)> {
    let build = &config.build;
    let output = normalize_path(&config.output_dir());
    let mut paths = vec![(normalize_path(&config.root), RecursiveMode::NonRecursive)];

    for dir in [&build.content, &build.templates, &build.assets, &build.static_dir] {
        let dir = normalize_path(&config.root_join(dir));
        if dir.starts_with(&output) || paths.iter().any(|(p, _)| *p == dir) {
            continue;
        }
        paths.push((dir, RecursiveMode::Recursive));
    }
    paths
}

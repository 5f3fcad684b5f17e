//! Collapses bursts of watcher events into one batch per quiet period.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::types::{Change, ChangeKind};
use crate::utils::path::normalize_path;

pub const DEBOUNCE: Duration = Duration::from_millis(300);
pub const REBUILD_COOLDOWN: Duration = Duration::from_millis(800);
/// Sleep while nothing is pending; any event wakes the actor first
const IDLE: Duration = Duration::from_secs(86400);

/// Pure debouncer: timing and per-path deduplication only.
///
/// Every method taking `now` is deterministic; the actor passes
/// `Instant::now()` and tests pass synthetic instants.
#[derive(Debug, Default)]
pub struct Debouncer {
    /// Path → kind; ordered so batches come out sorted
    pub(super) changes: BTreeMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
    pub(super) last_build: Option<Instant>,
    /// Our own output directory; its events are never changes
    ignored: Option<PathBuf>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignoring(mut self, dir: PathBuf) -> Self {
        self.ignored = Some(dir);
        self
    }

    /// Map a notify event to a change kind. Metadata-only modifications
    /// (mtime, chmod) and access events carry no content change.
    pub fn kind_of(event: &notify::Event) -> Option<ChangeKind> {
        use notify::EventKind;
        use notify::event::ModifyKind;

        match event.kind {
            EventKind::Create(_) => Some(ChangeKind::Created),
            EventKind::Remove(_) => Some(ChangeKind::Removed),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(ChangeKind::Modified),
            _ => None,
        }
    }

    pub fn add_event(&mut self, event: &notify::Event, now: Instant) {
        let Some(kind) = Self::kind_of(event) else {
            return;
        };
        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);
        for path in &event.paths {
            self.add(path, kind, now);
        }
    }

    /// Record one change, merging with a pending change to the same path:
    ///
    /// - removed, then created or modified: restored, keep the new kind
    /// - modified, then removed: removed
    /// - created, then removed: never existed, drop the entry
    /// - anything else: the first kind wins
    pub fn add(&mut self, path: &Path, kind: ChangeKind, now: Instant) {
        if is_temp_file(path) {
            return;
        }
        let path = normalize_path(path);
        if self.ignored.as_ref().is_some_and(|dir| path.starts_with(dir)) {
            return;
        }

        // Every accepted event restarts the quiet window, merged or not
        self.last_event = Some(now);

        match self.changes.get(&path).copied() {
            None => {
                crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
                self.changes.insert(path, kind);
            }
            Some(ChangeKind::Removed) if kind != ChangeKind::Removed => {
                self.changes.insert(path, kind);
            }
            Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                self.changes.insert(path, ChangeKind::Removed);
            }
            Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                self.changes.remove(&path);
            }
            Some(_) => {}
        }
    }

    /// Quiet for `DEBOUNCE` and out of the rebuild cooldown.
    pub fn is_ready(&self, now: Instant) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        if now.saturating_duration_since(last_event) < DEBOUNCE {
            return false;
        }
        if let Some(last_build) = self.last_build
            && now.saturating_duration_since(last_build) < REBUILD_COOLDOWN
        {
            return false;
        }
        !self.changes.is_empty()
    }

    /// Drain the batch if ready, starting the cooldown.
    pub fn take_if_ready(&mut self, now: Instant) -> Option<Vec<Change>> {
        if !self.is_ready(now) {
            return None;
        }
        self.last_event = None;
        self.last_build = Some(now);
        let changes = std::mem::take(&mut self.changes);
        Some(
            changes
                .into_iter()
                .map(|(path, kind)| Change { path, kind })
                .collect(),
        )
    }

    /// Drop everything pending (shutdown).
    pub fn clear(&mut self) {
        self.changes.clear();
        self.last_event = None;
    }

    /// Time until the batch could become ready.
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        let Some(last_event) = self.last_event.filter(|_| !self.changes.is_empty()) else {
            return IDLE;
        };

        let debounce_remaining = DEBOUNCE.saturating_sub(now.saturating_duration_since(last_event));
        let cooldown_remaining = self
            .last_build
            .map(|t| REBUILD_COOLDOWN.saturating_sub(now.saturating_duration_since(t)))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }
}

/// Editor artifacts: backups, swap files, dotfiles.
pub fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "swx" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
        || name == "4913"
}

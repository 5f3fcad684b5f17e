use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use super::debouncer::{DEBOUNCE, REBUILD_COOLDOWN, is_temp_file};
use super::*;
use crate::config::{SiteConfig, test_site_config};
use crate::task::{DirtySet, TaskGraph, site};

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

fn metadata_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ))
}

fn kind_at(debouncer: &Debouncer, path: &str) -> Option<ChangeKind> {
    debouncer.changes.get(Path::new(path)).copied()
}

// ============================================================================
// Debouncer
// ============================================================================

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new();
    assert!(!debouncer.is_ready(Instant::now()));
}

#[test]
fn test_event_routing_by_kind() {
    let now = Instant::now();
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.md"], create_kind()), now);
    debouncer.add_event(&make_event(vec!["/tmp/b.md"], modify_kind()), now);
    debouncer.add_event(&make_event(vec!["/tmp/c.md"], remove_kind()), now);

    assert_eq!(debouncer.changes.len(), 3);
    assert_eq!(kind_at(&debouncer, "/tmp/a.md"), Some(ChangeKind::Created));
    assert_eq!(kind_at(&debouncer, "/tmp/b.md"), Some(ChangeKind::Modified));
    assert_eq!(kind_at(&debouncer, "/tmp/c.md"), Some(ChangeKind::Removed));
}

#[test]
fn test_metadata_only_ignored() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], metadata_kind()), Instant::now());
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_temp_file_ignored() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/real.md"], modify_kind()), start);
    let later = start + Duration::from_millis(50);
    debouncer.add_event(
        &make_event(vec!["/tmp/.real.md.swp", "/tmp/real.md~", "/tmp/4913"], modify_kind()),
        later,
    );

    assert_eq!(debouncer.last_event, Some(start));
    assert_eq!(debouncer.changes.len(), 1);
}

#[test]
fn test_is_temp_file() {
    assert!(is_temp_file(Path::new("/site/content/.post.md.swp")));
    assert!(is_temp_file(Path::new("/site/content/post.md~")));
    assert!(is_temp_file(Path::new("/site/content/post.bak")));
    assert!(!is_temp_file(Path::new("/site/content/post.md")));
}

#[test]
fn test_dedup_first_event_wins() {
    let now = Instant::now();
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.md"], create_kind()), now);
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], modify_kind()), now);

    assert_eq!(debouncer.changes.len(), 1);
    assert_eq!(kind_at(&debouncer, "/tmp/a.md"), Some(ChangeKind::Created));
}

#[test]
fn test_dedup_same_event() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(
        &make_event(vec!["/tmp/a.md", "/tmp/a.md"], modify_kind()),
        Instant::now(),
    );
    assert_eq!(debouncer.changes.len(), 1);
}

#[test]
fn test_remove_then_create_restores() {
    let now = Instant::now();
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.md"], remove_kind()), now);
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], create_kind()), now);

    assert_eq!(debouncer.changes.len(), 1);
    assert_eq!(kind_at(&debouncer, "/tmp/a.md"), Some(ChangeKind::Created));
}

#[test]
fn test_create_then_remove_discards() {
    let now = Instant::now();
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.md"], create_kind()), now);
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], remove_kind()), now);

    assert!(debouncer.changes.is_empty(), "created+removed should discard");
}

#[test]
fn test_modify_then_remove_upgrades() {
    let now = Instant::now();
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.md"], modify_kind()), now);
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], remove_kind()), now);

    assert_eq!(kind_at(&debouncer, "/tmp/a.md"), Some(ChangeKind::Removed));
}

#[test]
fn test_ready_after_quiet_period() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], modify_kind()), start);

    assert!(debouncer.take_if_ready(start + DEBOUNCE / 2).is_none());

    let batch = debouncer.take_if_ready(start + DEBOUNCE).unwrap();
    assert_eq!(batch, [Change::new("/tmp/a.md", ChangeKind::Modified)]);
    assert!(debouncer.changes.is_empty());
}

#[test]
fn test_burst_extends_window() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new();
    for i in 0..5u32 {
        let at = start + Duration::from_millis(100) * i;
        debouncer.add_event(&make_event(vec!["/tmp/a.md"], modify_kind()), at);
    }
    // Last event at +400ms
    assert!(!debouncer.is_ready(start + Duration::from_millis(600)));
    let batch = debouncer.take_if_ready(start + Duration::from_millis(700)).unwrap();
    assert_eq!(batch.len(), 1);
}

#[test]
fn test_repeat_save_restarts_quiet_window() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new();
    let path = Path::new("/tmp/a.md");

    debouncer.add(path, ChangeKind::Modified, start);
    let again = start + Duration::from_millis(250);
    debouncer.add(path, ChangeKind::Modified, again);

    assert_eq!(debouncer.last_event, Some(again));
    assert!(!debouncer.is_ready(start + Duration::from_millis(400)));
    assert!(debouncer.is_ready(again + Duration::from_millis(300)));
}

#[test]
fn test_cooldown_holds_next_batch() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], modify_kind()), start);
    let first = start + DEBOUNCE;
    assert!(debouncer.take_if_ready(first).is_some());

    debouncer.add_event(&make_event(vec!["/tmp/b.md"], modify_kind()), first);
    assert!(!debouncer.is_ready(first + DEBOUNCE));
    assert!(debouncer.is_ready(first + REBUILD_COOLDOWN));
}

#[test]
fn test_batch_sorted_by_path() {
    let now = Instant::now();
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/b.md", "/tmp/a.md"], modify_kind()), now);
    let batch = debouncer.take_if_ready(now + DEBOUNCE).unwrap();
    let paths: Vec<_> = batch.iter().map(|c| c.path.clone()).collect();
    assert_eq!(paths, [PathBuf::from("/tmp/a.md"), PathBuf::from("/tmp/b.md")]);
}

#[test]
fn test_clear_discards_pending() {
    let now = Instant::now();
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], modify_kind()), now);
    debouncer.clear();
    assert!(debouncer.take_if_ready(now + DEBOUNCE).is_none());
}

#[test]
fn test_sleep_duration_no_events() {
    let debouncer = Debouncer::new();
    assert!(debouncer.sleep_duration(Instant::now()) >= Duration::from_secs(3600));
}

#[test]
fn test_sleep_duration_after_event() {
    let now = Instant::now();
    let mut debouncer = Debouncer::new();
    debouncer.add(Path::new("/site/content/posts/a.md"), ChangeKind::Modified, now);
    assert_eq!(debouncer.sleep_duration(now), DEBOUNCE);
    assert_eq!(
        debouncer.sleep_duration(now + Duration::from_millis(100)),
        DEBOUNCE - Duration::from_millis(100)
    );
}

#[test]
fn test_sleep_duration_idle_when_burst_cancels_out() {
    let now = Instant::now();
    let mut debouncer = Debouncer::new();
    debouncer.add(Path::new("/site/content/posts/a.md"), ChangeKind::Created, now);
    debouncer.add(Path::new("/site/content/posts/a.md"), ChangeKind::Removed, now);
    assert!(debouncer.sleep_duration(now) >= Duration::from_secs(3600));
}

#[test]
fn test_sleep_duration_respects_cooldown() {
    let now = Instant::now();
    let mut debouncer = Debouncer::new();
    debouncer.add(Path::new("/site/content/posts/a.md"), ChangeKind::Modified, now);
    debouncer.last_build = Some(now);
    assert_eq!(debouncer.sleep_duration(now), REBUILD_COOLDOWN);
}

// ============================================================================
// Router
// ============================================================================

struct Site {
    _dir: TempDir,
    config: SiteConfig,
    graph: TaskGraph,
    router: ChangeRouter,
}

impl Site {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = test_site_config(dir.path(), "");
        let graph = site::graph(&config).unwrap();
        let router = ChangeRouter::new(&graph, &config.root, &config.config_path).unwrap();
        Self {
            _dir: dir,
            config,
            graph,
            router,
        }
    }

    /// Create `rel` under the root and describe it as modified.
    fn touch(&self, rel: &str) -> Change {
        let path = self.config.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel).unwrap();
        Change::new(path, ChangeKind::Modified)
    }

    fn route(&self, rel: &str) -> Vec<String> {
        self.router
            .route(&self.touch(rel))
            .into_iter()
            .map(|n| n.to_string())
            .collect()
    }

    fn plan(&self, dirty: &DirtySet) -> Vec<String> {
        self.graph.plan(dirty).into_iter().map(|n| n.to_string()).collect()
    }
}

#[test]
fn test_route_by_input_pattern() {
    let site = Site::new();
    assert_eq!(site.route("content/posts/2013/hello.md"), ["content"]);
    assert_eq!(site.route("content/pages/about.md"), ["content"]);
    assert_eq!(site.route("templates/partials/head.html"), ["content"]);
    assert_eq!(site.route("templates/robots.txt"), ["robots"]);
    assert_eq!(site.route("assets/js/lib/util.js"), ["scripts"]);
    assert_eq!(site.route("assets/scss/_base.scss"), ["styles"]);
    assert_eq!(site.route("static/img/logo.png"), ["static"]);
    assert_eq!(site.route("CNAME"), ["static"]);
}

#[test]
fn test_unmatched_paths_dirty_nothing() {
    let site = Site::new();
    assert!(site.route("README.md").is_empty());
    assert!(site.route("content/posts/notes.txt").is_empty());
    assert!(site.route("public/index.html").is_empty());

    let outside = TempDir::new().unwrap();
    let stray = outside.path().join("post.md");
    fs::write(&stray, "x").unwrap();
    assert!(site.router.route(&Change::new(stray, ChangeKind::Modified)).is_empty());
}

#[test]
fn test_config_change_dirties_everything() {
    let site = Site::new();
    let change = Change::new(site.config.config_path.clone(), ChangeKind::Modified);
    let routed = site.router.route_batch(&[change]);

    assert!(routed.config_changed);
    assert_eq!(routed.dirty.len(), site.graph.len());
}

#[test]
fn test_post_change_plans_content_and_dependents() {
    let site = Site::new();
    let routed = site.router.route_batch(&[site.touch("content/posts/a.md")]);

    assert!(!routed.config_changed);
    assert_eq!(site.plan(&routed.dirty), ["content", "feeds", "sitemap", "search"]);
}

#[test]
fn test_batch_marks_each_task_once() {
    let site = Site::new();
    let changes = [
        site.touch("content/posts/a.md"),
        site.touch("content/posts/b.md"),
        site.touch("assets/scss/style.scss"),
    ];
    let routed = site.router.route_batch(&changes);
    let names: Vec<_> = routed.dirty.iter().map(|n| n.to_string()).collect();
    assert_eq!(names, ["content", "styles"]);
}

#[test]
fn test_removed_file_still_routes() {
    let site = Site::new();
    let mut change = site.touch("content/posts/gone.md");
    fs::remove_file(&change.path).unwrap();
    change.kind = ChangeKind::Removed;
    let names: Vec<_> = site.router.route(&change).into_iter().collect();
    assert_eq!(names.len(), 1);
}

// ============================================================================
// Freshness
// ============================================================================

#[test]
fn test_unchanged_content_is_dropped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.md");
    fs::write(&path, "same").unwrap();

    let mut freshness = FreshnessFilter::new();
    freshness.prime([path.clone()]);

    let touched = vec![Change::new(path.clone(), ChangeKind::Modified)];
    assert!(freshness.retain_changed(touched.clone()).is_empty());

    fs::write(&path, "different").unwrap();
    assert_eq!(freshness.retain_changed(touched.clone()), touched);
    // Second report of the same bytes is stale again
    assert!(freshness.retain_changed(touched).is_empty());
}

#[test]
fn test_created_and_removed_always_pass() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.md");
    fs::write(&path, "x").unwrap();

    let mut freshness = FreshnessFilter::new();
    freshness.prime([path.clone()]);

    let created = vec![Change::new(path.clone(), ChangeKind::Created)];
    assert_eq!(freshness.retain_changed(created.clone()), created);

    let removed = vec![Change::new(path, ChangeKind::Removed)];
    assert_eq!(freshness.retain_changed(removed.clone()), removed);
}

#[test]
fn test_unseen_file_passes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("new.md");
    fs::write(&path, "x").unwrap();

    let changes = vec![Change::new(path, ChangeKind::Modified)];
    assert_eq!(FreshnessFilter::new().retain_changed(changes.clone()), changes);
}

// ============================================================================
// Actor plumbing
// ============================================================================

#[test]
fn test_process_changes_routes_ready_batch() {
    crate::core::set_serving();
    let site = Site::new();
    let change = site.touch("content/posts/a.md");

    let mut debouncer = Debouncer::new();
    let past = Instant::now() - Duration::from_secs(2);
    debouncer.add(&change.path, ChangeKind::Modified, past);

    let msg = process_changes(&mut debouncer, &mut FreshnessFilter::new(), &site.router);
    let Some(crate::actor::messages::BuildMsg::Rebuild { dirty, config_changed, changed }) = msg
    else {
        panic!("expected a rebuild");
    };
    assert!(dirty.contains("content"));
    assert!(!config_changed);
    assert_eq!(changed.len(), 1);
}

#[test]
fn test_process_changes_ignores_unrouted() {
    crate::core::set_serving();
    let site = Site::new();
    let change = site.touch("notes.txt");

    let mut debouncer = Debouncer::new();
    debouncer.add(&change.path, ChangeKind::Modified, Instant::now() - Duration::from_secs(2));

    assert!(process_changes(&mut debouncer, &mut FreshnessFilter::new(), &site.router).is_none());
}

#[test]
fn test_output_events_are_skipped() {
    let mut debouncer = Debouncer::new().ignoring(PathBuf::from("/site/public"));
    let event = make_event(vec!["/site/public/index.html", "/site/content/a.md"], modify_kind());
    debouncer.add_event(&event, Instant::now());
    assert_eq!(debouncer.changes.len(), 1);
    assert!(debouncer.changes.contains_key(Path::new("/site/content/a.md")));
}

#[test]
fn test_watch_paths() {
    let dir = TempDir::new().unwrap();
    let config = test_site_config(dir.path(), "");
    let paths = watch_paths(&config);
    assert_eq!(paths[0].1, RecursiveMode::NonRecursive);
    assert_eq!(paths.len(), 5);
    assert!(paths[1..].iter().all(|(_, mode)| *mode == RecursiveMode::Recursive));
}

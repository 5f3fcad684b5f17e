//! Build actor: runs the scheduler for each routed batch.
//!
//! The scheduler is synchronous; each run goes to a blocking thread so the
//! watcher keeps collecting events meanwhile. Runs never overlap because
//! the actor awaits one before taking the next message.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::BuildMsg;
use crate::logger::{status_error, status_success, status_warning};
use crate::reload::Notifier;
use crate::task::{BuildContext, DirtySet, ExecutionReport, Scheduler, TaskGraph};

pub struct BuildActor {
    rx: mpsc::Receiver<BuildMsg>,
    graph: Arc<TaskGraph>,
    ctx: Arc<BuildContext>,
    notifier: Notifier,
}

impl BuildActor {
    pub fn new(
        rx: mpsc::Receiver<BuildMsg>,
        graph: Arc<TaskGraph>,
        ctx: Arc<BuildContext>,
        notifier: Notifier,
    ) -> Self {
        Self {
            rx,
            graph,
            ctx,
            notifier,
        }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                BuildMsg::Rebuild {
                    dirty,
                    config_changed,
                    changed,
                } => self.rebuild(dirty, config_changed, &changed).await,
                BuildMsg::Shutdown => break,
            }
        }
    }

    async fn rebuild(&self, dirty: DirtySet, config_changed: bool, changed: &[PathBuf]) {
        if config_changed {
            match self.ctx.config_handle().reload() {
                Ok(true) => crate::log!("watch"; "config reloaded"),
                Ok(false) => {}
                Err(e) => {
                    status_error("config invalid, keeping previous", &e.to_string());
                    self.notifier.error("config", e.to_string());
                    return;
                }
            }
        }

        if self.ctx.is_cancelled() {
            return;
        }

        if crate::logger::is_verbose() {
            let plan: Vec<_> = self.graph.plan(&dirty).iter().map(|n| n.as_str()).collect();
            crate::debug!("build"; "plan: {}", plan.join(" -> "));
        }

        let graph = Arc::clone(&self.graph);
        let ctx = Arc::clone(&self.ctx);
        let report =
            tokio::task::spawn_blocking(move || Scheduler::run(&graph, &ctx, &dirty)).await;

        match report {
            Ok(report) => self.publish(&report, changed),
            Err(e) => status_error("build thread panicked", &e.to_string()),
        }
    }

    /// Status line plus browser notification for a finished run.
    fn publish(&self, report: &ExecutionReport, changed: &[PathBuf]) {
        if report.was_cancelled() {
            return;
        }
        if let Some(failure) = report.failure() {
            status_error(&format!("{} failed", failure.task), &failure.message);
            self.notifier.error(failure.task.as_str(), failure.message);
            return;
        }

        let executed = report.executed().join(", ");
        if report.warnings.is_empty() {
            status_success(&format!("rebuilt: {executed} ({})", describe(changed)));
        } else {
            let detail: Vec<String> = report
                .warnings
                .iter()
                .map(|(task, warning)| format!("[{task}] {warning}"))
                .collect();
            status_warning(&detail.join("\n"));
        }
        self.notifier.clear_error();
        self.notifier.reload(executed);
    }
}

/// `a.md` or `a.md and 2 more`.
fn describe(changed: &[PathBuf]) -> String {
    let first = changed
        .first()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match changed.len() {
        0 | 1 => first,
        n => format!("{first} and {} more", n - 1),
    }
}

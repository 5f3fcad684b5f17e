//! Runs the closure of a dirty set in dependency order.

use std::{
    fs,
    path::Path,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use rayon::prelude::*;

use super::{
    BuildContext, DirtySet, ExecutionReport, Task, TaskGraph, TaskName, TaskRecord, TaskStatus,
    Warning,
};
use crate::debug;

/// Result of one task, before it is merged into the report.
struct Outcome {
    name: TaskName,
    status: TaskStatus,
    duration: Duration,
    warnings: Vec<Warning>,
}

pub struct Scheduler;

impl Scheduler {
    /// Run every dirty task and everything downstream of it.
    ///
    /// Tasks run one at a time in topological order, or level by level on
    /// rayon when `build.parallel` is set. A failure stops the run: nothing
    /// after it starts, and what already ran stays on disk. The cancel flag
    /// is checked before each task starts.
    pub fn run(graph: &TaskGraph, ctx: &BuildContext, dirty: &DirtySet) -> ExecutionReport {
        let order = graph.closure(dirty);
        let mut report = ExecutionReport::default();
        if order.is_empty() {
            return report;
        }

        let batches = if ctx.config().build.parallel {
            graph.levels(&order)
        } else {
            order.iter().map(|&node| vec![node]).collect()
        };

        let mut halted: Option<TaskStatus> = None;
        for batch in batches {
            if let Some(status) = &halted {
                for &node in &batch {
                    report.records.push(TaskRecord {
                        name: graph.task(node).name.clone(),
                        status: status.clone(),
                        duration: Duration::ZERO,
                    });
                }
                continue;
            }

            let outcomes: Vec<Outcome> = if batch.len() > 1 {
                batch
                    .par_iter()
                    .map(|&node| run_task(graph.task(node), ctx))
                    .collect()
            } else {
                batch
                    .iter()
                    .map(|&node| run_task(graph.task(node), ctx))
                    .collect()
            };

            for outcome in outcomes {
                match outcome.status {
                    TaskStatus::Failed(_) => halted = Some(TaskStatus::Skipped),
                    TaskStatus::Cancelled if halted.is_none() => {
                        halted = Some(TaskStatus::Cancelled);
                    }
                    _ => {}
                }
                report.warnings.extend(
                    outcome
                        .warnings
                        .into_iter()
                        .map(|w| (outcome.name.clone(), w)),
                );
                report.records.push(TaskRecord {
                    name: outcome.name,
                    status: outcome.status,
                    duration: outcome.duration,
                });
            }
        }

        report
    }
}

fn run_task(task: &Task, ctx: &BuildContext) -> Outcome {
    let name = task.name.clone();
    if ctx.is_cancelled() {
        return Outcome {
            name,
            status: TaskStatus::Cancelled,
            duration: Duration::ZERO,
            warnings: Vec::new(),
        };
    }

    debug!("task"; "running {name}");
    let start = Instant::now();
    let result = task.action.run(ctx).and_then(|output| {
        let stale = ctx.replace_outputs(&name, &output.written);
        prune(&ctx.config().output_dir(), &stale)?;
        Ok(output.warnings)
    });
    let duration = start.elapsed();

    let (status, warnings) = match result {
        Ok(warnings) => (TaskStatus::Succeeded, warnings),
        Err(e) => (TaskStatus::Failed(format!("{e:#}")), Vec::new()),
    };
    debug!("task"; "{name} {status} in {}ms", duration.as_millis());

    Outcome {
        name,
        status,
        duration,
        warnings,
    }
}

/// Remove stale outputs and any directories they leave empty.
///
/// Paths outside the output directory are never touched.
fn prune(output: &Path, stale: &[std::path::PathBuf]) -> Result<()> {
    for path in stale.iter().filter(|p| p.starts_with(output)) {
        if path.is_file() {
            fs::remove_file(path)
                .with_context(|| format!("failed to remove stale output {}", path.display()))?;
            debug!("task"; "pruned {}", path.display());
        }

        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == output || !d.starts_with(output) {
                break;
            }
            // Stops at the first non-empty directory
            if fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }
    Ok(())
}

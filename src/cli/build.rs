//! `kiln build` and `kiln clean`.

use std::fs;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};

use crate::config::{ConfigHandle, Overrides, SiteConfig};
use crate::core::session_cancel;
use crate::task::{BuildContext, DirtySet, ExecutionReport, Scheduler, TaskGraph, site};
use crate::log;
use crate::utils::path::normalize_path;

/// Build context sharing the Ctrl+C cancel flag.
pub fn context(config: SiteConfig, overrides: Overrides) -> Arc<BuildContext> {
    let handle = ConfigHandle::new(config, overrides);
    Arc::new(BuildContext::new(Arc::new(handle), session_cancel()))
}

/// Delete the output directory, then run every task.
pub fn build_site(config: &SiteConfig, overrides: &Overrides) -> Result<ExecutionReport> {
    let graph = site::graph(config)?;
    clean(config)?;
    let ctx = context(config.clone(), overrides.clone());
    full_build(&graph, &ctx)
}

/// Run every task in `graph`, failing on the first task error.
///
/// Warnings are printed either way.
pub fn full_build(graph: &TaskGraph, ctx: &BuildContext) -> Result<ExecutionReport> {
    let start = Instant::now();
    let report = Scheduler::run(graph, ctx, &DirtySet::full(graph));
    print_warnings(&report);

    if report.was_cancelled() {
        bail!("build cancelled");
    }
    let report = report.into_result()?;
    log!(
        "build";
        "{} tasks in {:.2?}",
        report.executed().len(),
        start.elapsed()
    );
    Ok(report)
}

pub fn print_warnings(report: &ExecutionReport) {
    for (task, warning) in &report.warnings {
        log!("warn"; "[{task}] {warning}");
    }
}

/// Remove the output directory if present.
///
/// Refuses when the resolved output directory is the site root or one of
/// its ancestors.
pub fn clean(config: &SiteConfig) -> Result<()> {
    let output = config.output_dir();
    let resolved = match output.canonicalize() {
        Ok(path) => path,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).with_context(|| format!("failed to resolve {}", output.display())),
    };
    if normalize_path(&config.root).starts_with(&resolved) {
        bail!(
            "refusing to delete {}: build.output contains the site root",
            resolved.display()
        );
    }
    match fs::remove_dir_all(&output) {
        Ok(()) => {
            crate::debug!("clean"; "removed {}", output.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", output.display())),
    }
}

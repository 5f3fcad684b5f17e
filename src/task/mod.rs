//! Build tasks and their orchestration.
//!
//! ```text
//! TaskRegistry ──build──► TaskGraph ──┬──► Scheduler::run(graph, ctx, dirty) ──► ExecutionReport
//!   (declare)            (immutable)  └──► ChangeRouter (input patterns)
//! ```
//!
//! A [`Task`] names its predecessors, the input globs it reads (relative to
//! the site root) and the output globs it owns (relative to the output
//! directory). The graph is built once per process and passed by reference.

mod context;
mod graph;
mod registry;
mod report;
mod scheduler;
pub mod site;


pub use context::BuildContext;
pub use graph::{DirtySet, GraphError, TaskGraph};
pub use registry::TaskRegistry;
pub use report::{ExecutionReport, TaskRecord, TaskStatus};
pub use scheduler::Scheduler;

use std::{borrow::Borrow, fmt, path::PathBuf, sync::Arc};

use anyhow::Result;

/// Interned task name, cheap to clone into reports and dirty sets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskName(Arc<str>);

impl TaskName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskName {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl Borrow<str> for TaskName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-fatal problem attributed to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Source path relative to the site root
    pub source: String,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

/// What a task action produced.
#[derive(Debug, Default)]
pub struct TaskOutput {
    /// Absolute paths of every file written by this run
    pub written: Vec<PathBuf>,
    pub warnings: Vec<Warning>,
}

impl TaskOutput {
    pub fn with_written(written: Vec<PathBuf>) -> Self {
        Self {
            written,
            warnings: Vec::new(),
        }
    }
}

/// The work a task performs.
///
/// Actions must be deterministic for identical input file contents.
pub trait TaskAction: Send + Sync {
    fn run(&self, ctx: &BuildContext) -> Result<TaskOutput>;
}

impl<F> TaskAction for F
where
    F: Fn(&BuildContext) -> Result<TaskOutput> + Send + Sync,
{
    fn run(&self, ctx: &BuildContext) -> Result<TaskOutput> {
        self(ctx)
    }
}

/// A named unit of work with declared ordering and file ownership.
pub struct Task {
    pub name: TaskName,
    /// Predecessors, in declaration order
    pub after: Vec<TaskName>,
    /// Globs relative to the site root
    pub inputs: Vec<String>,
    /// Globs relative to the output directory
    pub outputs: Vec<String>,
    pub action: Box<dyn TaskAction>,
}

impl Task {
    pub fn new<F>(name: &str, action: F) -> Self
    where
        F: Fn(&BuildContext) -> Result<TaskOutput> + Send + Sync + 'static,
    {
        Self::with_action(name, action)
    }

    pub fn with_action(name: &str, action: impl TaskAction + 'static) -> Self {
        Self {
            name: TaskName::from(name),
            after: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            action: Box::new(action),
        }
    }

    pub fn after(mut self, name: &str) -> Self {
        self.after.push(TaskName::from(name));
        self
    }

    pub fn input(mut self, pattern: impl Into<String>) -> Self {
        self.inputs.push(pattern.into());
        self
    }

    pub fn output(mut self, pattern: impl Into<String>) -> Self {
        self.outputs.push(pattern.into());
        self
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("after", &self.after)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

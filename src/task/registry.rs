//! Task declarations, before the graph is validated.

use super::{Task, TaskName};

/// Ordered collection of task declarations.
///
/// Registration order is significant: it breaks ties in topological order
/// and in cycle reporting, which keeps every traversal deterministic.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    pub(super) tasks: Vec<Task>,
    /// Extra `(before, after)` edges beyond each task's own `after` list
    pub(super) constraints: Vec<(TaskName, TaskName)>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task: Task) -> &mut Self {
        self.tasks.push(task);
        self
    }

    /// Require `before` to complete before `after` starts.
    pub fn order(&mut self, before: &str, after: &str) -> &mut Self {
        self.constraints
            .push((TaskName::from(before), TaskName::from(after)));
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

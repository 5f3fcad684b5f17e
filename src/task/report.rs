//! Outcome of one scheduler run.

use std::{fmt, time::Duration};

use thiserror::Error;

use super::{TaskName, Warning};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Succeeded,
    Failed(String),
    /// Not started because an earlier task failed
    Skipped,
    /// Not started because the run was cancelled
    Cancelled,
}

impl TaskStatus {
    /// Whether the action was actually invoked.
    pub fn ran(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("ok"),
            Self::Failed(_) => f.write_str("failed"),
            Self::Skipped => f.write_str("skipped"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub name: TaskName,
    pub status: TaskStatus,
    pub duration: Duration,
}

/// A task action returned an error; the run stopped there.
#[derive(Debug, Clone, Error)]
#[error("task `{task}` failed: {message}")]
pub struct TaskFailure {
    pub task: TaskName,
    pub message: String,
}

/// Ordered record of every task the run considered.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub records: Vec<TaskRecord>,
    /// Per-document warnings, tagged with the task that raised them
    pub warnings: Vec<(TaskName, Warning)>,
}

impl ExecutionReport {
    /// Tasks whose action ran, in execution order.
    pub fn executed(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.status.ran())
            .map(|r| r.name.as_str())
            .collect()
    }

    pub fn status(&self, name: &str) -> Option<&TaskStatus> {
        self.records
            .iter()
            .find(|r| r.name.as_str() == name)
            .map(|r| &r.status)
    }

    /// First failure, if any.
    pub fn failure(&self) -> Option<TaskFailure> {
        self.records.iter().find_map(|r| match &r.status {
            TaskStatus::Failed(message) => Some(TaskFailure {
                task: r.name.clone(),
                message: message.clone(),
            }),
            _ => None,
        })
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        self.records
            .iter()
            .all(|r| r.status == TaskStatus::Succeeded)
    }

    pub fn was_cancelled(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.status == TaskStatus::Cancelled)
    }

    /// Turn the report into a `Result`, keeping warnings on success.
    pub fn into_result(self) -> Result<Self, TaskFailure> {
        match self.failure() {
            Some(failure) => Err(failure),
            None => Ok(self),
        }
    }
}

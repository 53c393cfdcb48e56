//! Error types for scheduler operations.

use thiserror::Error;

use super::{Resources, TaskId};

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A task with the same id was already admitted to the subsystem.
    #[error("duplicate task: {0}")]
    DuplicateTask(TaskId),
    /// Task demand can never be satisfied by the subsystem's total capacity.
    #[error("task {task} demand ({demand}) exceeds capacity ({capacity})")]
    ExceedsCapacity {
        /// Rejected task.
        task: TaskId,
        /// What the task asked for.
        demand: Resources,
        /// Total subsystem capacity.
        capacity: Resources,
    },
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

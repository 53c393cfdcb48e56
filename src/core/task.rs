//! Task record, resource vectors, and the task state machine.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Opaque task identifier, unique within its subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A pair of consumable resource amounts (R1, R2).
///
/// Used both for task demands and for subsystem capacity/availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Amount of resource R1.
    pub r1: u32,
    /// Amount of resource R2.
    pub r2: u32,
}

impl Resources {
    /// Create a resource pair.
    #[must_use]
    pub const fn new(r1: u32, r2: u32) -> Self {
        Self { r1, r2 }
    }

    /// True if `self` fits inside `pool` component-wise.
    #[must_use]
    pub const fn fits_within(self, pool: Self) -> bool {
        self.r1 <= pool.r1 && self.r2 <= pool.r2
    }

    /// Subtract `demand` from `self`, or `None` if either component would underflow.
    #[must_use]
    pub fn checked_sub(self, demand: Self) -> Option<Self> {
        Some(Self {
            r1: self.r1.checked_sub(demand.r1)?,
            r2: self.r2.checked_sub(demand.r2)?,
        })
    }
}

impl Add for Resources {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            r1: self.r1 + rhs.r1,
            r2: self.r2 + rhs.r2,
        }
    }
}

impl AddAssign for Resources {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R1: {}, R2: {}", self.r1, self.r2)
    }
}

/// Lifecycle state of a task. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Demand did not fit the available pool at last check.
    Waiting,
    /// Admitted and awaiting a core.
    Ready,
    /// Occupying a core.
    Running,
    /// Finished and retired; resources released.
    Completed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Waiting => "Waiting",
            Self::Ready => "Ready",
            Self::Running => "Running",
            Self::Completed => "Completed",
        };
        f.write_str(s)
    }
}

/// One unit of work and its mutable execution state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Identifier, unique within the owning subsystem.
    pub id: TaskId,
    /// Arrival time as given by the workload.
    pub arrival_time: u32,
    /// Total execution time required, in ticks.
    pub exec_time: u32,
    /// Resource demand held while running.
    pub demand: Resources,
    /// Optional priority carried from the workload.
    pub priority: Option<u32>,
    /// Optional repeat count carried from the workload.
    pub repeat: Option<u32>,
    remaining_time: u32,
    state: TaskState,
}

impl Task {
    /// Create a task in the `Waiting` state with `remaining_time == exec_time`.
    pub fn new(id: impl Into<TaskId>, arrival_time: u32, exec_time: u32, demand: Resources) -> Self {
        Self {
            id: id.into(),
            arrival_time,
            exec_time,
            demand,
            priority: None,
            repeat: None,
            remaining_time: exec_time,
            state: TaskState::Waiting,
        }
    }

    /// Attach a priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attach a repeat count.
    #[must_use]
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// Ticks of execution still owed.
    #[must_use]
    pub const fn remaining_time(&self) -> u32 {
        self.remaining_time
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// True once no execution time remains.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.remaining_time == 0
    }

    /// Consume one tick of execution. Saturates at zero.
    pub(crate) fn advance(&mut self) {
        self.remaining_time = self.remaining_time.saturating_sub(1);
    }

    pub(crate) fn set_state(&mut self, next: TaskState) {
        debug_assert!(
            next >= self.state,
            "task {} regressed from {} to {}",
            self.id,
            self.state,
            next
        );
        self.state = next;
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task({}, Arrival={}, ExecTime={}, R1={}, R2={}, State={})",
            self.id, self.arrival_time, self.exec_time, self.demand.r1, self.demand.r2, self.state
        )
    }
}

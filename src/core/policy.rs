//! Scheduling policies that order the ready queue before core assignment.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{SchedulerError, Task};

/// Policy used to pick ready tasks for idle cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPolicy {
    /// Serve the ready queue in FIFO order.
    #[default]
    RoundRobin,
    /// Shortest remaining time first; ties keep queue order.
    Srtf,
}

impl SchedulingPolicy {
    /// Reorder the ready queue in place before a scheduling pass.
    ///
    /// Round Robin leaves the queue untouched. SRTF performs a stable sort
    /// ascending by remaining time.
    pub fn order_ready_queue(self, ready: &mut VecDeque<Task>) {
        match self {
            Self::RoundRobin => {}
            Self::Srtf => {
                ready
                    .make_contiguous()
                    .sort_by_key(Task::remaining_time);
            }
        }
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundRobin => f.write_str("Round Robin"),
            Self::Srtf => f.write_str("SRTF"),
        }
    }
}

impl FromStr for SchedulingPolicy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "roundrobin" | "rr" => Ok(Self::RoundRobin),
            "srtf" => Ok(Self::Srtf),
            _ => Err(SchedulerError::InvalidConfig(format!(
                "unknown scheduling policy `{s}`"
            ))),
        }
    }
}

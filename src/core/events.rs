//! Structured subsystem events and sink implementations.
//!
//! Every subsystem emits an [`EventRecord`] for admissions, core assignments,
//! requeues, retirements, and a per-tick [`SubsystemSnapshot`]. Consumers
//! install an [`EventSink`]; the crate ships a bounded in-memory sink for tests
//! and a sink that renders records through `tracing`.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use super::{SubsystemId, SubsystemSnapshot, TaskId, TaskState};

/// Something that happened inside a subsystem.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubsystemEvent {
    /// Task accepted by `add_task` and routed to `state`.
    Admitted {
        /// Admitted task.
        task: TaskId,
        /// Waiting or Ready.
        state: TaskState,
    },
    /// Waiting task moved to the ready queue.
    Promoted {
        /// Promoted task.
        task: TaskId,
    },
    /// Ready task placed on a core.
    Started {
        /// Started task.
        task: TaskId,
        /// Zero-based core index.
        core: usize,
    },
    /// Ready task popped for a core but no longer fit; returned to the queue tail.
    Requeued {
        /// Requeued task.
        task: TaskId,
    },
    /// Finished task removed from its core and its resources released.
    Completed {
        /// Completed task.
        task: TaskId,
        /// Zero-based core index it ran on.
        core: usize,
    },
    /// End-of-tick status.
    Tick(SubsystemSnapshot),
}

/// An event stamped with its origin.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    /// Emitting subsystem.
    pub subsystem: SubsystemId,
    /// Subsystem tick at which the event happened (0 before the first tick).
    pub tick: u64,
    /// The event itself.
    pub event: SubsystemEvent,
}

/// Event sink abstraction.
pub trait EventSink: Send {
    /// Record an event.
    fn record(&mut self, record: EventRecord);
}

/// Bounded in-memory sink. Clones share the same buffer, so a test can keep
/// one handle and give the other to a subsystem.
#[derive(Clone)]
pub struct InMemoryEventSink {
    events: Arc<Mutex<VecDeque<EventRecord>>>,
    max_events: usize,
}

impl InMemoryEventSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(1024)))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<EventRecord> {
        self.events.lock().iter().cloned().collect()
    }

    /// Drop all stored events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&mut self, record: EventRecord) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(record);
    }
}

/// Sink that renders events as log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&mut self, record: EventRecord) {
        let EventRecord {
            subsystem, tick, event,
        } = record;
        match event {
            SubsystemEvent::Admitted { task, state } => {
                tracing::debug!(subsystem, tick, "task {task} admitted as {state}");
            }
            SubsystemEvent::Promoted { task } => {
                tracing::debug!(subsystem, tick, "task {task} promoted to ready");
            }
            SubsystemEvent::Started { task, core } => {
                tracing::info!(
                    subsystem,
                    tick,
                    "task {task} started on core {} in subsystem {subsystem}",
                    core + 1
                );
            }
            SubsystemEvent::Requeued { task } => {
                tracing::debug!(subsystem, tick, "task {task} does not fit, requeued");
            }
            SubsystemEvent::Completed { task, core } => {
                tracing::info!(
                    subsystem,
                    tick,
                    "task {task} completed on core {} in subsystem {subsystem}",
                    core + 1
                );
            }
            SubsystemEvent::Tick(snapshot) => {
                tracing::info!(subsystem, tick, "\n{snapshot}");
            }
        }
    }
}

//! Subsystem scheduling engine.
//!
//! A [`Subsystem`] owns a two-resource pool, a fixed array of cores, a waiting
//! list, a FIFO ready queue, and a completed list. Each call to
//! [`Subsystem::step`] runs one tick:
//!
//! 1. advance the tick counter
//! 2. promote waiting tasks that now fit the available pool
//! 3. retire finished tasks and release their resources
//! 4. assign ready tasks to idle cores under the configured policy
//! 5. charge one tick of execution to every running task
//! 6. emit a status snapshot
//!
//! Steps 1-5 run under the subsystem mutex, which also guards admission, so
//! tasks may be admitted from other threads while the subsystem is running.
//! Pacing between ticks is left to the caller (see `runtime::driver`).

use std::collections::{HashSet, VecDeque};
use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;

use super::{
    EventRecord, EventSink, SchedulerError, SchedulingPolicy, SubsystemEvent, Task, TaskId,
    TaskState, Resources,
};

/// Subsystem identifier, 1-based in workload order.
pub type SubsystemId = u32;

/// Why a subsystem stopped advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every admitted task completed.
    Completed {
        /// Ticks taken.
        ticks: u64,
    },
    /// The configured tick limit was reached first.
    TickLimit {
        /// Ticks taken.
        ticks: u64,
    },
    /// A stop signal was observed.
    Stopped {
        /// Ticks taken.
        ticks: u64,
    },
}

impl RunOutcome {
    /// Ticks executed before the subsystem stopped.
    #[must_use]
    pub const fn ticks(self) -> u64 {
        match self {
            Self::Completed { ticks } | Self::TickLimit { ticks } | Self::Stopped { ticks } => {
                ticks
            }
        }
    }
}

/// A task occupying a core, as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreOccupant {
    /// Running task.
    pub task: TaskId,
    /// Ticks it still owes.
    pub remaining_time: u32,
    /// Resources it holds.
    pub demand: Resources,
}

/// Point-in-time view of a subsystem, safe to hand to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsystemSnapshot {
    /// Subsystem identifier.
    pub subsystem: SubsystemId,
    /// Current tick.
    pub tick: u64,
    /// Active policy.
    pub policy: SchedulingPolicy,
    /// Total capacity.
    pub capacity: Resources,
    /// Currently unallocated resources.
    pub available: Resources,
    /// Waiting task ids in list order.
    pub waiting: Vec<TaskId>,
    /// Ready task ids in queue order.
    pub ready: Vec<TaskId>,
    /// Per-core occupant, `None` when idle.
    pub cores: Vec<Option<CoreOccupant>>,
    /// Completed task ids in completion order.
    pub completed: Vec<TaskId>,
}

impl SubsystemSnapshot {
    /// Sum of the demands of every task on a core.
    #[must_use]
    pub fn held(&self) -> Resources {
        self.cores
            .iter()
            .flatten()
            .fold(Resources::default(), |acc, occ| acc + occ.demand)
    }

    /// Same predicate as [`Subsystem::is_done`], evaluated on the snapshot.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.waiting.is_empty() && self.ready.is_empty() && self.cores.iter().all(Option::is_none)
    }
}

fn write_ids(f: &mut fmt::Formatter<'_>, ids: &[TaskId]) -> fmt::Result {
    f.write_str("[")?;
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{id}")?;
    }
    f.write_str("]")
}

impl fmt::Display for SubsystemSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time: {}, Subsystem {} State:", self.tick, self.subsystem)?;
        writeln!(f, "Resources: {}", self.available)?;
        f.write_str("Waiting Queue: ")?;
        write_ids(f, &self.waiting)?;
        f.write_str("\nReady Queue: ")?;
        write_ids(f, &self.ready)?;
        f.write_str("\nCores: [")?;
        for (i, core) in self.cores.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match core {
                Some(occ) => write!(f, "{}", occ.task)?,
                None => f.write_str("Idle")?,
            }
        }
        f.write_str("]")
    }
}

/// Mutable scheduling state guarded by the subsystem mutex.
struct SubsystemState {
    available: Resources,
    cores: Vec<Option<Task>>,
    ready: VecDeque<Task>,
    waiting: Vec<Task>,
    completed: Vec<Task>,
    admitted: HashSet<TaskId>,
    tick: u64,
    outcome: Option<RunOutcome>,
}

impl SubsystemState {
    fn is_done(&self) -> bool {
        self.ready.is_empty() && self.waiting.is_empty() && self.cores.iter().all(Option::is_none)
    }

    /// Move every waiting task that fits the available pool to the ready
    /// queue, preserving waiting-list order. Does not reserve.
    fn promote(&mut self, events: &mut Vec<SubsystemEvent>) {
        let available = self.available;
        let (eligible, still_waiting): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.waiting)
            .into_iter()
            .partition(|task| task.demand.fits_within(available));
        self.waiting = still_waiting;
        for mut task in eligible {
            task.set_state(TaskState::Ready);
            events.push(SubsystemEvent::Promoted {
                task: task.id.clone(),
            });
            self.ready.push_back(task);
        }
    }

    /// Release every finished task still sitting on a core.
    fn retire(&mut self, events: &mut Vec<SubsystemEvent>) {
        for (core, slot) in self.cores.iter_mut().enumerate() {
            if !slot.as_ref().is_some_and(Task::is_finished) {
                continue;
            }
            if let Some(mut task) = slot.take() {
                self.available += task.demand;
                task.set_state(TaskState::Completed);
                events.push(SubsystemEvent::Completed {
                    task: task.id.clone(),
                    core,
                });
                self.completed.push(task);
            }
        }
    }

    /// Fill idle cores from the ready queue. A popped task that no longer
    /// fits goes back to the tail and the core stays idle this tick.
    fn schedule(&mut self, policy: SchedulingPolicy, events: &mut Vec<SubsystemEvent>) {
        policy.order_ready_queue(&mut self.ready);
        for core in 0..self.cores.len() {
            if self.cores[core].is_some() {
                continue;
            }
            let Some(mut task) = self.ready.pop_front() else {
                continue;
            };
            match self.available.checked_sub(task.demand) {
                Some(remaining) => {
                    self.available = remaining;
                    task.set_state(TaskState::Running);
                    events.push(SubsystemEvent::Started {
                        task: task.id.clone(),
                        core,
                    });
                    self.cores[core] = Some(task);
                }
                None => {
                    events.push(SubsystemEvent::Requeued {
                        task: task.id.clone(),
                    });
                    self.ready.push_back(task);
                }
            }
        }
    }

    fn advance_running(&mut self) {
        for task in self.cores.iter_mut().flatten() {
            task.advance();
        }
    }

    fn snapshot(&self, subsystem: SubsystemId, policy: SchedulingPolicy, capacity: Resources) -> SubsystemSnapshot {
        SubsystemSnapshot {
            subsystem,
            tick: self.tick,
            policy,
            capacity,
            available: self.available,
            waiting: self.waiting.iter().map(|t| t.id.clone()).collect(),
            ready: self.ready.iter().map(|t| t.id.clone()).collect(),
            cores: self
                .cores
                .iter()
                .map(|slot| {
                    slot.as_ref().map(|t| CoreOccupant {
                        task: t.id.clone(),
                        remaining_time: t.remaining_time(),
                        demand: t.demand,
                    })
                })
                .collect(),
            completed: self.completed.iter().map(|t| t.id.clone()).collect(),
        }
    }
}

/// Independent scheduling domain with its own resource pool, cores, and queues.
pub struct Subsystem {
    id: SubsystemId,
    capacity: Resources,
    policy: SchedulingPolicy,
    reject_oversized: bool,
    state: Mutex<SubsystemState>,
    events: Option<Mutex<Box<dyn EventSink>>>,
}

impl fmt::Debug for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subsystem")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .field("reject_oversized", &self.reject_oversized)
            .finish_non_exhaustive()
    }
}

impl Subsystem {
    /// Create an empty subsystem with `capacity` fully available.
    #[must_use]
    pub fn new(id: SubsystemId, capacity: Resources, core_count: usize, policy: SchedulingPolicy) -> Self {
        Self {
            id,
            capacity,
            policy,
            reject_oversized: true,
            state: Mutex::new(SubsystemState {
                available: capacity,
                cores: vec![None; core_count],
                ready: VecDeque::new(),
                waiting: Vec::new(),
                completed: Vec::new(),
                admitted: HashSet::new(),
                tick: 0,
                outcome: None,
            }),
            events: None,
        }
    }

    /// Attach an event sink.
    #[must_use]
    pub fn with_events(mut self, sink: Box<dyn EventSink>) -> Self {
        self.events = Some(Mutex::new(sink));
        self
    }

    /// Choose whether tasks whose demand exceeds total capacity are rejected
    /// by [`add_task`](Self::add_task) (the default) or parked in the waiting
    /// list, where they will never become eligible.
    #[must_use]
    pub fn with_oversized_rejection(mut self, reject: bool) -> Self {
        self.reject_oversized = reject;
        self
    }

    /// Subsystem identifier.
    #[must_use]
    pub const fn id(&self) -> SubsystemId {
        self.id
    }

    /// Total resource capacity.
    #[must_use]
    pub const fn capacity(&self) -> Resources {
        self.capacity
    }

    /// Active scheduling policy.
    #[must_use]
    pub const fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    /// Admit a task.
    ///
    /// The task goes to the ready queue if its demand fits the *currently
    /// available* pool, otherwise to the waiting list. Nothing is reserved;
    /// the fit is checked again when a core is assigned.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::DuplicateTask`] if the id was already admitted.
    /// - [`SchedulerError::ExceedsCapacity`] if the demand exceeds total
    ///   capacity and oversized rejection is enabled.
    pub fn add_task(&self, mut task: Task) -> Result<TaskState, SchedulerError> {
        if self.reject_oversized && !task.demand.fits_within(self.capacity) {
            tracing::warn!(
                "subsystem {}: task {} demand ({}) exceeds capacity ({})",
                self.id,
                task.id,
                task.demand,
                self.capacity
            );
            return Err(SchedulerError::ExceedsCapacity {
                task: task.id,
                demand: task.demand,
                capacity: self.capacity,
            });
        }

        let id = task.id.clone();
        let (tick, routed) = {
            let mut state = self.state.lock();
            if state.admitted.contains(&task.id) {
                return Err(SchedulerError::DuplicateTask(task.id));
            }
            state.admitted.insert(task.id.clone());

            if task.demand.fits_within(state.available) {
                task.set_state(TaskState::Ready);
                state.ready.push_back(task);
                (state.tick, TaskState::Ready)
            } else {
                task.set_state(TaskState::Waiting);
                state.waiting.push(task);
                (state.tick, TaskState::Waiting)
            }
        };

        self.emit(
            tick,
            std::iter::once(SubsystemEvent::Admitted {
                task: id,
                state: routed,
            }),
        );
        Ok(routed)
    }

    /// Run one tick and return the end-of-tick snapshot.
    pub fn step(&self) -> SubsystemSnapshot {
        let mut events = Vec::new();
        let snapshot = {
            let mut state = self.state.lock();
            state.tick += 1;
            state.promote(&mut events);
            state.retire(&mut events);
            state.schedule(self.policy, &mut events);
            state.advance_running();
            state.snapshot(self.id, self.policy, self.capacity)
        };

        events.push(SubsystemEvent::Tick(snapshot.clone()));
        self.emit(snapshot.tick, events);
        snapshot
    }

    /// True iff the waiting list and ready queue are empty and no core is occupied.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state.lock().is_done()
    }

    /// Current value of the tick counter.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.state.lock().tick
    }

    /// Currently unallocated resources.
    #[must_use]
    pub fn available(&self) -> Resources {
        self.state.lock().available
    }

    /// Read-only view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SubsystemSnapshot {
        self.state.lock().snapshot(self.id, self.policy, self.capacity)
    }

    /// Completed tasks in completion order.
    #[must_use]
    pub fn completed_tasks(&self) -> Vec<Task> {
        self.state.lock().completed.clone()
    }

    /// How the last run ended, if it has ended.
    #[must_use]
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.state.lock().outcome
    }

    /// True once a run outcome has been recorded.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.outcome().is_some()
    }

    /// Forget the previous run's outcome so a new run can settle it again.
    pub(crate) fn unsettle(&self) {
        self.state.lock().outcome = None;
    }

    pub(crate) fn settle(&self, outcome: RunOutcome) {
        tracing::info!("subsystem {} settled: {:?}", self.id, outcome);
        self.state.lock().outcome = Some(outcome);
    }

    /// Step without pacing until done or until `max_ticks` ticks have run.
    pub fn run_to_completion(&self, max_ticks: Option<u64>) -> RunOutcome {
        let outcome = loop {
            let (done, tick) = {
                let state = self.state.lock();
                (state.is_done(), state.tick)
            };
            if done {
                break RunOutcome::Completed { ticks: tick };
            }
            if max_ticks.is_some_and(|limit| tick >= limit) {
                break RunOutcome::TickLimit { ticks: tick };
            }
            self.step();
        };
        self.settle(outcome);
        outcome
    }

    fn emit(&self, tick: u64, events: impl IntoIterator<Item = SubsystemEvent>) {
        if let Some(sink) = &self.events {
            let mut sink = sink.lock();
            for event in events {
                sink.record(EventRecord {
                    subsystem: self.id,
                    tick,
                    event,
                });
            }
        }
    }
}

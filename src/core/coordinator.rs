//! Coordinator that runs every subsystem concurrently and observes completion.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::{Resources, RunOutcome, Subsystem, SubsystemId};
use crate::config::SimulationConfig;

/// Abstraction for spawning subsystem drivers on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Cooperative stop signal shared between the coordinator and its drivers.
///
/// Drivers check it at the top of every tick; the coordinator checks it on
/// every poll.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    /// Create an unsignalled handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every driver sharing this handle to stop after its current tick.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// True once [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Pacing and limits for a coordinated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Wall-clock time between ticks. Zero runs ticks back to back.
    pub tick_interval: Duration,
    /// Wall-clock time between status polls. Zero polls on every yield.
    pub poll_interval: Duration,
    /// Per-subsystem tick limit.
    pub max_ticks: Option<u64>,
}

impl CoordinatorSettings {
    /// Settings with no pacing, for tests and batch runs.
    #[must_use]
    pub const fn accelerated() -> Self {
        Self {
            tick_interval: Duration::ZERO,
            poll_interval: Duration::ZERO,
            max_ticks: None,
        }
    }
}

impl From<&SimulationConfig> for CoordinatorSettings {
    fn from(cfg: &SimulationConfig) -> Self {
        Self {
            tick_interval: cfg.tick_interval(),
            poll_interval: cfg.poll_interval(),
            max_ticks: cfg.max_ticks,
        }
    }
}

/// Coarse per-subsystem status reported while polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsystemStatus {
    /// Subsystem identifier.
    pub subsystem: SubsystemId,
    /// Current tick.
    pub tick: u64,
    /// Currently unallocated resources.
    pub available: Resources,
    /// Whether the completion predicate holds.
    pub done: bool,
}

/// Result of a coordinated run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatorReport {
    /// Outcome per subsystem, in registration order.
    pub outcomes: Vec<(SubsystemId, RunOutcome)>,
    /// Number of status polls performed.
    pub polls: u64,
}

impl CoordinatorReport {
    /// True if every subsystem ran to completion.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, outcome)| matches!(outcome, RunOutcome::Completed { .. }))
    }
}

/// Starts subsystems and polls them until all are settled. Never mutates
/// subsystem scheduling state.
#[derive(Debug)]
pub struct Coordinator {
    subsystems: Vec<Arc<Subsystem>>,
    settings: CoordinatorSettings,
    stop: StopHandle,
}

impl Coordinator {
    /// Create a coordinator with no subsystems.
    #[must_use]
    pub fn new(settings: CoordinatorSettings) -> Self {
        Self {
            subsystems: Vec::new(),
            settings,
            stop: StopHandle::new(),
        }
    }

    /// Register a subsystem and return a shared handle to it.
    pub fn add_subsystem(&mut self, subsystem: Subsystem) -> Arc<Subsystem> {
        let subsystem = Arc::new(subsystem);
        self.subsystems.push(Arc::clone(&subsystem));
        subsystem
    }

    /// Registered subsystems in registration order.
    #[must_use]
    pub fn subsystems(&self) -> &[Arc<Subsystem>] {
        &self.subsystems
    }

    /// Handle that stops every driver started by [`run`](Self::run).
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// True iff every subsystem satisfies its completion predicate.
    #[must_use]
    pub fn all_done(&self) -> bool {
        self.subsystems.iter().all(|s| s.is_done())
    }

    fn all_settled(&self) -> bool {
        self.subsystems.iter().all(|s| s.is_settled())
    }

    /// Coarse status of every subsystem.
    #[must_use]
    pub fn status(&self) -> Vec<SubsystemStatus> {
        self.subsystems
            .iter()
            .map(|s| SubsystemStatus {
                subsystem: s.id(),
                tick: s.current_tick(),
                available: s.available(),
                done: s.is_done(),
            })
            .collect()
    }

    /// Spawn one driver per subsystem and poll until every subsystem has
    /// settled (completed, hit its tick limit, or observed the stop signal).
    ///
    /// Outcomes from an earlier run are cleared before any driver starts, so
    /// `run` may be called again after more tasks are admitted. Tick limits
    /// count from tick 0, not from the start of this run.
    #[cfg(feature = "tokio-runtime")]
    pub async fn run<S: Spawn>(&self, spawner: &S) -> CoordinatorReport {
        use crate::runtime::driver::{drive, pause, Pacing};

        let pacing = Pacing {
            tick_interval: self.settings.tick_interval,
            max_ticks: self.settings.max_ticks,
        };
        for subsystem in &self.subsystems {
            subsystem.unsettle();
        }
        for subsystem in &self.subsystems {
            tracing::info!(
                "starting subsystem {} ({} policy, capacity {})",
                subsystem.id(),
                subsystem.policy(),
                subsystem.capacity()
            );
            let subsystem = Arc::clone(subsystem);
            let stop = self.stop.clone();
            spawner.spawn(async move {
                drive(subsystem, pacing, stop).await;
            });
        }

        let mut polls = 0;
        while !self.all_settled() {
            pause(self.settings.poll_interval).await;
            polls += 1;
            for status in self.status() {
                tracing::info!(
                    "Subsystem {} State at Time {}: Resources: {}",
                    status.subsystem,
                    status.tick,
                    status.available
                );
            }
        }

        let outcomes = self
            .subsystems
            .iter()
            .filter_map(|s| s.outcome().map(|o| (s.id(), o)))
            .collect();
        tracing::info!("all subsystems settled after {} polls", polls);
        CoordinatorReport { outcomes, polls }
    }
}

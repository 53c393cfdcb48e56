//! Builders to construct populated subsystems from a parsed workload.

use crate::config::SimulationConfig;
use crate::core::{EventSink, Resources, SchedulerError, Subsystem, SubsystemId, TaskId};
use crate::infra::workload::Workload;

/// Builder for a single subsystem from shared configuration.
pub struct SubsystemBuilder {
    id: SubsystemId,
    capacity: Resources,
    config: SimulationConfig,
    events: Option<Box<dyn EventSink>>,
}

impl SubsystemBuilder {
    /// Start a builder for subsystem `id` with total `capacity`.
    #[must_use]
    pub fn new(id: SubsystemId, capacity: Resources, config: SimulationConfig) -> Self {
        Self {
            id,
            capacity,
            config,
            events: None,
        }
    }

    /// Attach an event sink.
    #[must_use]
    pub fn events(mut self, sink: Box<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Subsystem id this builder targets.
    #[must_use]
    pub const fn id(&self) -> SubsystemId {
        self.id
    }

    /// Configuration the subsystem will be built with.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Build an empty subsystem.
    #[must_use]
    pub fn build(self) -> Subsystem {
        let subsystem = Subsystem::new(self.id, self.capacity, self.config.core_count, self.config.policy)
            .with_oversized_rejection(self.config.reject_oversized);
        match self.events {
            Some(sink) => subsystem.with_events(sink),
            None => subsystem,
        }
    }
}

/// A task the builder could not admit.
#[derive(Debug)]
pub struct Rejection {
    /// Subsystem the task belonged to.
    pub subsystem: SubsystemId,
    /// Rejected task.
    pub task: TaskId,
    /// Why admission failed.
    pub error: SchedulerError,
}

/// Subsystems ready to run plus any admission failures.
#[derive(Debug)]
pub struct BuildReport {
    /// Populated subsystems in workload order.
    pub subsystems: Vec<Subsystem>,
    /// Tasks rejected by `add_task`.
    pub rejected: Vec<Rejection>,
}

/// Build one subsystem per workload block and admit its tasks in file order.
///
/// `sink_factory` is called once per subsystem to supply an optional event
/// sink. Admission failures are collected, not fatal.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidConfig`] if `cfg` fails validation.
pub fn build_subsystems<F>(
    cfg: &SimulationConfig,
    workload: Workload,
    mut sink_factory: F,
) -> Result<BuildReport, SchedulerError>
where
    F: FnMut(SubsystemId) -> Option<Box<dyn EventSink>>,
{
    cfg.validate()
        .map_err(|e| SchedulerError::InvalidConfig(format!("config invalid: {e}")))?;

    let mut subsystems = Vec::with_capacity(workload.blocks.len());
    let mut rejected = Vec::new();
    for block in workload.blocks {
        let mut builder = SubsystemBuilder::new(block.id, block.capacity, cfg.clone());
        if let Some(sink) = sink_factory(block.id) {
            builder = builder.events(sink);
        }
        let subsystem = builder.build();

        for task in block.tasks {
            let id = task.id.clone();
            if let Err(error) = subsystem.add_task(task) {
                tracing::warn!("subsystem {}: task {} rejected: {}", block.id, id, error);
                rejected.push(Rejection {
                    subsystem: block.id,
                    task: id,
                    error,
                });
            }
        }
        subsystems.push(subsystem);
    }

    Ok(BuildReport {
        subsystems,
        rejected,
    })
}

//! Core scheduling abstractions and resource accounting.

pub mod coordinator;
pub mod error;
pub mod events;
pub mod policy;
pub mod subsystem;
pub mod task;

pub use coordinator::{
    Coordinator, CoordinatorReport, CoordinatorSettings, Spawn, StopHandle, SubsystemStatus,
};
pub use error::{AppResult, SchedulerError};
pub use events::{EventRecord, EventSink, InMemoryEventSink, SubsystemEvent, TracingEventSink};
pub use policy::SchedulingPolicy;
pub use subsystem::{CoreOccupant, RunOutcome, Subsystem, SubsystemId, SubsystemSnapshot};
pub use task::{Resources, Task, TaskId, TaskState};

//! # cpu_sched_sim
//!
//! A discrete-time simulator of CPU scheduling under multi-resource constraints.
//!
//! The simulation is made of independent *subsystems*. Each subsystem has a
//! fixed pool of two consumable resources (R1, R2), a fixed number of cores,
//! and a workload of tasks that must be admitted, queued, scheduled onto
//! cores, and retired. Subsystems share nothing, so each one runs on its own
//! clock while a [`Coordinator`](core::Coordinator) watches for global
//! completion.
//!
//! ## Scheduling Loop
//!
//! Every tick a subsystem, in this order:
//!
//! - **Promotes** waiting tasks whose demand now fits the available pool
//! - **Retires** finished tasks and releases their resources
//! - **Schedules** ready tasks onto idle cores (Round Robin or SRTF)
//! - **Advances** every running task by one tick
//!
//! Admission only routes a task to the ready queue or the waiting list; the
//! pool is charged when a core is assigned and refunded on retirement.
//!
//! ## Deterministic Use
//!
//! ```rust
//! use cpu_sched_sim::core::{Resources, RunOutcome, SchedulingPolicy, Subsystem, Task};
//!
//! let subsystem = Subsystem::new(1, Resources::new(2, 2), 1, SchedulingPolicy::RoundRobin);
//! subsystem.add_task(Task::new("T1", 0, 2, Resources::new(1, 1))).unwrap();
//! subsystem.add_task(Task::new("T2", 0, 1, Resources::new(2, 2))).unwrap();
//!
//! let outcome = subsystem.run_to_completion(None);
//! assert!(matches!(outcome, RunOutcome::Completed { .. }));
//! assert_eq!(subsystem.completed_tasks().len(), 2);
//! ```
//!
//! ## Coordinated Use
//!
//! ```rust,ignore
//! use cpu_sched_sim::builders::build_subsystems;
//! use cpu_sched_sim::config::SimulationConfig;
//! use cpu_sched_sim::core::{Coordinator, CoordinatorSettings};
//! use cpu_sched_sim::infra::load_workload;
//! use cpu_sched_sim::runtime::TokioSpawner;
//!
//! let cfg = SimulationConfig::from_env()?;
//! let report = build_subsystems(&cfg, load_workload("input.txt")?, |_| None)?;
//! let mut coordinator = Coordinator::new(CoordinatorSettings::from(&cfg));
//! for subsystem in report.subsystems {
//!     coordinator.add_subsystem(subsystem);
//! }
//! let summary = coordinator.run(&TokioSpawner::current()).await;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling engine, task model, events, and coordinator.
pub mod core;
/// Configuration models for simulation runs.
pub mod config;
/// Builders to construct subsystems from configuration and workloads.
pub mod builders;
/// Infrastructure adapters such as the workload loader.
pub mod infra;
/// Runtime adapters: tick driver and Tokio spawner.
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
/// Shared utilities.
pub mod util;

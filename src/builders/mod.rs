//! Builders to construct subsystems from configuration and parsed workloads.

pub mod subsystem_builder;

pub use subsystem_builder::{build_subsystems, BuildReport, Rejection, SubsystemBuilder};

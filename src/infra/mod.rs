//! Infrastructure adapters around the scheduling core.

pub mod workload;

pub use workload::{load_workload, parse_workload, LoadError, ParseIssue, SubsystemBlock, Workload};

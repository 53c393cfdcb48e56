//! Tests for error types

use cpu_sched_sim::core::{Resources, SchedulerError, TaskId};
use cpu_sched_sim::infra::{LoadError, ParseIssue};

#[test]
fn test_duplicate_task_error() {
    let err = SchedulerError::DuplicateTask(TaskId::from("T1"));
    assert_eq!(format!("{}", err), "duplicate task: T1");
}

#[test]
fn test_exceeds_capacity_error() {
    let err = SchedulerError::ExceedsCapacity {
        task: TaskId::from("big"),
        demand: Resources::new(5, 1),
        capacity: Resources::new(4, 4),
    };
    assert_eq!(
        format!("{}", err),
        "task big demand (R1: 5, R2: 1) exceeds capacity (R1: 4, R2: 4)"
    );
}

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("core_count must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: core_count must be greater than 0"
    );
}

#[test]
fn test_parse_issue_messages() {
    let issue = ParseIssue::OrphanTask {
        line: 3,
        text: "T9 0 1 1 1".to_string(),
    };
    assert_eq!(issue.to_string(), "line 3: no subsystem available for task `T9 0 1 1 1`");

    let issue = ParseIssue::MalformedTask {
        line: 7,
        text: "T1 0".to_string(),
    };
    assert_eq!(issue.to_string(), "line 7: malformed task `T1 0`");
}

#[test]
fn test_load_error_keeps_source() {
    let err = LoadError::Io {
        path: "input.txt".into(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    };
    assert_eq!(err.to_string(), "failed to read workload input.txt: gone");
    assert!(std::error::Error::source(&err).is_some());
}

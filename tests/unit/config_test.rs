//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use cpu_sched_sim::config::SimulationConfig;
use cpu_sched_sim::core::SchedulingPolicy;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_default_config_is_valid() {
    let cfg = SimulationConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.core_count, 3);
    assert_eq!(cfg.policy, SchedulingPolicy::RoundRobin);
    assert_eq!(cfg.tick_interval(), Duration::from_secs(1));
    assert_eq!(cfg.poll_interval(), Duration::from_secs(5));
    assert!(cfg.reject_oversized);
}

#[test]
fn test_zero_cores_invalid() {
    let cfg = SimulationConfig {
        core_count: 0,
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_poll_shorter_than_tick_invalid() {
    let cfg = SimulationConfig {
        tick_interval_ms: 100,
        poll_interval_ms: 10,
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_unpaced_config_valid() {
    let cfg = SimulationConfig {
        tick_interval_ms: 0,
        poll_interval_ms: 0,
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_zero_tick_limit_invalid() {
    let cfg = SimulationConfig {
        max_ticks: Some(0),
        ..SimulationConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "core_count": 2,
        "policy": "srtf",
        "tick_interval_ms": 0,
        "poll_interval_ms": 0,
        "max_ticks": 500
    }"#;

    let cfg = SimulationConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.core_count, 2);
    assert_eq!(cfg.policy, SchedulingPolicy::Srtf);
    assert_eq!(cfg.max_ticks, Some(500));
    // omitted fields fall back to defaults
    assert!(cfg.reject_oversized);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(SimulationConfig::from_json_str(r#"{"core_count": 0}"#).is_err());
    assert!(SimulationConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_from_lookup() {
    let cfg = SimulationConfig::from_lookup(lookup(&[
        ("SCHED_CORES", "4"),
        ("SCHED_POLICY", "SRTF"),
        ("SCHED_TICK_MS", "0"),
        ("SCHED_POLL_MS", "250"),
        ("SCHED_REJECT_OVERSIZED", "false"),
        ("SCHED_MAX_TICKS", "1000"),
    ]))
    .unwrap();
    assert_eq!(cfg.core_count, 4);
    assert_eq!(cfg.policy, SchedulingPolicy::Srtf);
    assert_eq!(cfg.tick_interval_ms, 0);
    assert_eq!(cfg.poll_interval_ms, 250);
    assert!(!cfg.reject_oversized);
    assert_eq!(cfg.max_ticks, Some(1000));
}

#[test]
fn test_config_from_lookup_uses_defaults_when_unset() {
    let cfg = SimulationConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, SimulationConfig::default());
}

#[test]
fn test_config_from_lookup_reports_bad_values() {
    let err = SimulationConfig::from_lookup(lookup(&[("SCHED_CORES", "many")])).unwrap_err();
    assert!(err.contains("SCHED_CORES"));

    let err = SimulationConfig::from_lookup(lookup(&[("SCHED_POLICY", "lottery")])).unwrap_err();
    assert!(err.contains("SCHED_POLICY"));
}

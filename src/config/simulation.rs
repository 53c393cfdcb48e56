//! Simulation configuration: core count, policy, pacing, and limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::SchedulingPolicy;

/// Cores per subsystem when nothing else is configured.
pub const DEFAULT_CORE_COUNT: usize = 3;

/// Settings shared by every subsystem in a run.
///
/// Core count and policy are not part of the workload file; they come from
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Cores per subsystem.
    pub core_count: usize,
    /// Scheduling policy for every subsystem.
    pub policy: SchedulingPolicy,
    /// Wall-clock milliseconds between ticks. Zero runs unpaced.
    pub tick_interval_ms: u64,
    /// Wall-clock milliseconds between coordinator status polls.
    pub poll_interval_ms: u64,
    /// Reject tasks whose demand exceeds total subsystem capacity at admission.
    pub reject_oversized: bool,
    /// Optional per-subsystem tick limit.
    pub max_ticks: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            core_count: DEFAULT_CORE_COUNT,
            policy: SchedulingPolicy::RoundRobin,
            tick_interval_ms: 1000,
            poll_interval_ms: 5000,
            reject_oversized: true,
            max_ticks: None,
        }
    }
}

impl SimulationConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.core_count == 0 {
            return Err("core_count must be greater than 0".into());
        }
        if self.poll_interval_ms < self.tick_interval_ms {
            return Err(format!(
                "poll_interval_ms ({}) must not be shorter than tick_interval_ms ({})",
                self.poll_interval_ms, self.tick_interval_ms
            ));
        }
        if self.max_ticks == Some(0) {
            return Err("max_ticks must be greater than 0 when set".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `SCHED_*` environment variables, loading a
    /// `.env` file first if one exists. Unset variables keep their defaults.
    ///
    /// Recognised: `SCHED_CORES`, `SCHED_POLICY`, `SCHED_TICK_MS`,
    /// `SCHED_POLL_MS`, `SCHED_REJECT_OVERSIZED`, `SCHED_MAX_TICKS`.
    pub fn from_env() -> Result<Self, String> {
        // missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("SCHED_CORES") {
            cfg.core_count = parse_var("SCHED_CORES", &v)?;
        }
        if let Some(v) = lookup("SCHED_POLICY") {
            cfg.policy = v.parse().map_err(|e| format!("SCHED_POLICY: {e}"))?;
        }
        if let Some(v) = lookup("SCHED_TICK_MS") {
            cfg.tick_interval_ms = parse_var("SCHED_TICK_MS", &v)?;
        }
        if let Some(v) = lookup("SCHED_POLL_MS") {
            cfg.poll_interval_ms = parse_var("SCHED_POLL_MS", &v)?;
        }
        if let Some(v) = lookup("SCHED_REJECT_OVERSIZED") {
            cfg.reject_oversized = parse_var("SCHED_REJECT_OVERSIZED", &v)?;
        }
        if let Some(v) = lookup("SCHED_MAX_TICKS") {
            cfg.max_ticks = Some(parse_var("SCHED_MAX_TICKS", &v)?);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Tick interval as a `Duration`.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Poll interval as a `Duration`.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| format!("{key}: invalid value `{value}`: {e}"))
}

//! Pacing driver that advances a subsystem one tick at a time.

use std::sync::Arc;
use std::time::Duration;

use crate::core::{RunOutcome, StopHandle, Subsystem};

/// How fast a driver advances its subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Time to wait after each tick. Zero yields to the runtime instead.
    pub tick_interval: Duration,
    /// Stop after this many ticks even if work remains.
    pub max_ticks: Option<u64>,
}

/// Sleep for `interval`, or just yield when it is zero so accelerated runs
/// still let other tasks make progress.
pub async fn pause(interval: Duration) {
    if interval.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(interval).await;
    }
}

/// Step `subsystem` until it is done, the tick limit is reached, or `stop`
/// is signalled. Records and returns the outcome.
pub async fn drive(subsystem: Arc<Subsystem>, pacing: Pacing, stop: StopHandle) -> RunOutcome {
    let outcome = loop {
        let tick = subsystem.current_tick();
        if stop.is_stopped() {
            break RunOutcome::Stopped { ticks: tick };
        }
        if subsystem.is_done() {
            break RunOutcome::Completed { ticks: tick };
        }
        if pacing.max_ticks.is_some_and(|limit| tick >= limit) {
            tracing::warn!("subsystem {} hit tick limit {}", subsystem.id(), tick);
            break RunOutcome::TickLimit { ticks: tick };
        }

        subsystem.step();
        pause(pacing.tick_interval).await;
    };
    subsystem.settle(outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Resources, SchedulingPolicy, Task};

    fn accelerated(max_ticks: Option<u64>) -> Pacing {
        Pacing {
            tick_interval: Duration::ZERO,
            max_ticks,
        }
    }

    #[tokio::test]
    async fn test_drive_runs_to_completion() {
        let sub = Arc::new(Subsystem::new(1, Resources::new(2, 2), 1, SchedulingPolicy::RoundRobin));
        sub.add_task(Task::new("a", 0, 2, Resources::new(1, 1))).unwrap();

        let outcome = drive(Arc::clone(&sub), accelerated(None), StopHandle::new()).await;
        assert_eq!(outcome, RunOutcome::Completed { ticks: 3 });
        assert!(sub.is_done());
        assert_eq!(sub.outcome(), Some(outcome));
    }

    #[tokio::test]
    async fn test_drive_respects_stop_signal() {
        let sub = Arc::new(Subsystem::new(1, Resources::new(1, 1), 1, SchedulingPolicy::RoundRobin));
        sub.add_task(Task::new("a", 0, 100, Resources::new(1, 1))).unwrap();
        let stop = StopHandle::new();
        stop.stop();

        let outcome = drive(Arc::clone(&sub), accelerated(None), stop).await;
        assert_eq!(outcome, RunOutcome::Stopped { ticks: 0 });
        assert!(!sub.is_done());
    }

    #[tokio::test]
    async fn test_drive_respects_tick_limit() {
        let sub = Arc::new(Subsystem::new(1, Resources::new(1, 1), 1, SchedulingPolicy::RoundRobin));
        sub.add_task(Task::new("a", 0, 100, Resources::new(1, 1))).unwrap();

        let outcome = drive(Arc::clone(&sub), accelerated(Some(4)), StopHandle::new()).await;
        assert_eq!(outcome, RunOutcome::TickLimit { ticks: 4 });
        assert_eq!(sub.current_tick(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_real_time_pacing_advances_one_tick_per_interval() {
        let sub = Arc::new(Subsystem::new(1, Resources::new(1, 1), 1, SchedulingPolicy::RoundRobin));
        sub.add_task(Task::new("a", 0, 3, Resources::new(1, 1))).unwrap();
        let pacing = Pacing {
            tick_interval: Duration::from_secs(1),
            max_ticks: None,
        };

        let start = tokio::time::Instant::now();
        let outcome = drive(Arc::clone(&sub), pacing, StopHandle::new()).await;
        assert_eq!(outcome, RunOutcome::Completed { ticks: 4 });
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }
}

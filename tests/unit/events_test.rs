//! Tests for event sinks

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use cpu_sched_sim::core::{
    EventRecord, EventSink, InMemoryEventSink, Resources, SchedulingPolicy, Subsystem,
    SubsystemEvent, Task, TaskState, TracingEventSink,
};

#[test]
fn test_subsystem_emits_lifecycle_events_in_order() {
    let sink = InMemoryEventSink::new(64);
    let sub = Subsystem::new(3, Resources::new(1, 1), 1, SchedulingPolicy::RoundRobin)
        .with_events(Box::new(sink.clone()));
    sub.add_task(Task::new("a", 0, 1, Resources::new(1, 1))).unwrap();
    sub.run_to_completion(None);

    let kinds: Vec<(u64, &'static str)> = sink
        .events()
        .iter()
        .map(|r| {
            let kind = match &r.event {
                SubsystemEvent::Admitted { state: TaskState::Ready, .. } => "admitted",
                SubsystemEvent::Admitted { .. } => "admitted-waiting",
                SubsystemEvent::Promoted { .. } => "promoted",
                SubsystemEvent::Started { .. } => "started",
                SubsystemEvent::Requeued { .. } => "requeued",
                SubsystemEvent::Completed { .. } => "completed",
                SubsystemEvent::Tick(_) => "tick",
            };
            (r.tick, kind)
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            (0, "admitted"),
            (1, "started"),
            (1, "tick"),
            (2, "completed"),
            (2, "tick"),
        ]
    );
    assert!(sink.events().iter().all(|r| r.subsystem == 3));
}

#[test]
fn test_tick_event_carries_snapshot() {
    let sink = InMemoryEventSink::new(8);
    let sub = Subsystem::new(1, Resources::new(2, 2), 2, SchedulingPolicy::Srtf)
        .with_events(Box::new(sink.clone()));
    sub.add_task(Task::new("a", 0, 3, Resources::new(1, 2))).unwrap();
    let snap = sub.step();

    let last = sink.events().pop().unwrap();
    match last.event {
        SubsystemEvent::Tick(seen) => assert_eq!(seen, snap),
        other => panic!("expected tick event, got {other:?}"),
    }
}

#[test]
fn test_tracing_sink_accepts_every_event() {
    let mut sink = TracingEventSink;
    let sub = Subsystem::new(1, Resources::new(1, 1), 1, SchedulingPolicy::RoundRobin);
    let snap = sub.snapshot();
    for event in [
        SubsystemEvent::Admitted {
            task: "a".into(),
            state: TaskState::Waiting,
        },
        SubsystemEvent::Promoted { task: "a".into() },
        SubsystemEvent::Started {
            task: "a".into(),
            core: 0,
        },
        SubsystemEvent::Requeued { task: "a".into() },
        SubsystemEvent::Completed {
            task: "a".into(),
            core: 0,
        },
        SubsystemEvent::Tick(snap),
    ] {
        sink.record(EventRecord {
            subsystem: 1,
            tick: 1,
            event,
        });
    }
}

#[test]
fn test_snapshot_serializes_to_json() {
    let sub = Subsystem::new(1, Resources::new(2, 2), 1, SchedulingPolicy::RoundRobin);
    sub.add_task(Task::new("a", 0, 2, Resources::new(1, 1))).unwrap();
    sub.add_task(Task::new("b", 0, 2, Resources::new(1, 1))).unwrap();
    let snap = sub.step();

    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["tick"], 1);
    assert_eq!(json["policy"], "round_robin");
    assert_eq!(json["available"]["r1"], 1);
    assert_eq!(json["ready"][0], "b");
    assert_eq!(json["cores"][0]["task"], "a");
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_tracing_sink_logs_each_completion_once() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let sub = Subsystem::new(1, Resources::new(1, 1), 1, SchedulingPolicy::RoundRobin)
            .with_events(Box::new(TracingEventSink));
        sub.add_task(Task::new("a", 0, 1, Resources::new(1, 1))).unwrap();
        sub.run_to_completion(None);
    });

    let lines = log.lines();
    let completed: Vec<_> = lines.iter().filter(|l| l.contains("task a completed")).collect();
    assert_eq!(completed.len(), 1, "log was: {lines:#?}");
    assert!(completed[0].contains("on core 1"));
    let started = lines.iter().filter(|l| l.contains("task a started")).count();
    assert_eq!(started, 1);
}

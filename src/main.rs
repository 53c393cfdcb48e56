//! cpu-sched-sim: run a workload file to completion.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use cpu_sched_sim::builders::build_subsystems;
use cpu_sched_sim::config::SimulationConfig;
use cpu_sched_sim::core::{
    AppResult, Coordinator, CoordinatorSettings, EventSink, TracingEventSink,
};
use cpu_sched_sim::infra::load_workload;
use cpu_sched_sim::runtime::TokioSpawner;
use cpu_sched_sim::util::init_tracing;

#[derive(Parser)]
#[command(name = "cpu-sched-sim")]
#[command(about = "Simulate multi-resource CPU scheduling for a workload file", long_about = None)]
struct Cli {
    /// Workload file
    workload: PathBuf,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = SimulationConfig::from_env().map_err(anyhow::Error::msg)?;
    let workload = load_workload(&cli.workload)
        .with_context(|| format!("cannot start without workload {}", cli.workload.display()))?;
    if !workload.issues.is_empty() {
        warn!("{} workload line(s) skipped", workload.issues.len());
    }

    let report = build_subsystems(&config, workload, |_| {
        Some(Box::new(TracingEventSink) as Box<dyn EventSink>)
    })?;

    let mut coordinator = Coordinator::new(CoordinatorSettings::from(&config));
    for subsystem in report.subsystems {
        coordinator.add_subsystem(subsystem);
    }
    info!(
        "running {} subsystem(s) with {} cores each under {}",
        coordinator.subsystems().len(),
        config.core_count,
        config.policy
    );

    let summary = coordinator.run(&TokioSpawner::current()).await;
    for (subsystem, outcome) in &summary.outcomes {
        info!(
            "subsystem {} finished after {} tick(s): {:?}",
            subsystem,
            outcome.ticks(),
            outcome
        );
    }
    if !report.rejected.is_empty() {
        warn!("{} task(s) rejected at admission", report.rejected.len());
    }
    Ok(())
}

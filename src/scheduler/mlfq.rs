use super::{RunOutcome, Scheduler};
use crate::core::{Mlfq, SchedulerConfig, SimEvent};
use crate::sim::Job;

/// Runs the MLFQ engine to completion, discarding its event stream.
pub struct MlfqScheduler {
    config: SchedulerConfig,
}

impl MlfqScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Run and keep the event stream alongside the outcome.
    pub fn run_with_events(&self, jobs: &[Job]) -> (RunOutcome, Vec<SimEvent>) {
        let mut engine = Mlfq::new(jobs, self.config.clone());
        let events = engine.run();
        (outcome(&engine), events)
    }
}

impl Scheduler for MlfqScheduler {
    fn name(&self) -> &'static str {
        "MLFQ"
    }

    fn run(&mut self, jobs: &[Job]) -> RunOutcome {
        self.run_with_events(jobs).0
    }
}

pub fn outcome(engine: &Mlfq) -> RunOutcome {
    RunOutcome {
        scheduler: "MLFQ",
        records: engine.records(),
        timeline: engine.timeline().clone(),
        busy_ticks: engine.busy_ticks(),
        context_switches: engine.context_switches(),
    }
}

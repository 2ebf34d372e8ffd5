use serde::Serialize;
use std::num::NonZeroU64;
use tracing::debug;

use super::{Job, Metrics};
use crate::core::SchedulerConfig;
use crate::scheduler::{
    FcfsScheduler, MlfqScheduler, RoundRobinScheduler, RunOutcome, Scheduler, SjfScheduler,
};

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonEntry {
    pub scheduler: &'static str,
    pub metrics: Metrics,
}

/// Metrics of every policy over the same workload.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub entries: Vec<ComparisonEntry>,
}

impl Comparison {
    /// Run MLFQ, Round Robin, FCFS and SJF, each on its own fresh records.
    pub fn run(jobs: &[Job], config: &SchedulerConfig, rr_quantum: NonZeroU64) -> Self {
        let mut schedulers: Vec<Box<dyn Scheduler>> = vec![
            Box::new(MlfqScheduler::new(config.clone())),
            Box::new(RoundRobinScheduler::new(rr_quantum)),
            Box::new(FcfsScheduler),
            Box::new(SjfScheduler),
        ];

        let entries = schedulers
            .iter_mut()
            .map(|scheduler| {
                let outcome: RunOutcome = scheduler.run(jobs);
                let metrics = outcome.metrics();
                debug!(
                    scheduler = scheduler.name(),
                    avg_turnaround = metrics.avg_turnaround,
                    context_switches = metrics.context_switches,
                    "comparison run finished"
                );
                ComparisonEntry {
                    scheduler: scheduler.name(),
                    metrics,
                }
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, scheduler: &str) -> Option<&Metrics> {
        self.entries
            .iter()
            .find(|e| e.scheduler == scheduler)
            .map(|e| &e.metrics)
    }

    /// Lowest average turnaround; the earlier entry wins ties.
    pub fn best_turnaround(&self) -> Option<&ComparisonEntry> {
        self.best_by(|m| m.avg_turnaround)
    }

    /// Lowest average waiting time; the earlier entry wins ties.
    pub fn best_waiting(&self) -> Option<&ComparisonEntry> {
        self.best_by(|m| m.avg_waiting)
    }

    fn best_by(&self, key: impl Fn(&Metrics) -> f64) -> Option<&ComparisonEntry> {
        self.entries.iter().reduce(|best, entry| {
            if key(&entry.metrics) < key(&best.metrics) {
                entry
            } else {
                best
            }
        })
    }
}

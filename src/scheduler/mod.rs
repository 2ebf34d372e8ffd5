pub mod fcfs;
pub mod mlfq;
pub mod round_robin;
pub mod sjf;

use serde::Serialize;

use crate::core::{ProcessRecord, Ticks};
use crate::sim::{Job, Metrics, Timeline};
pub use fcfs::FcfsScheduler;
pub use mlfq::MlfqScheduler;
pub use round_robin::RoundRobinScheduler;
pub use sjf::SjfScheduler;

/// Quantum used by the Round-Robin baseline unless told otherwise.
pub const DEFAULT_RR_QUANTUM: Ticks = 4;

/// Everything a finished run hands to reporting.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub scheduler: &'static str,
    /// In arrival order, all completed
    pub records: Vec<ProcessRecord>,
    pub timeline: Timeline,
    pub busy_ticks: Ticks,
    pub context_switches: u64,
}

impl RunOutcome {
    pub fn metrics(&self) -> Metrics {
        Metrics::compute(&self.records, self.busy_ticks, self.context_switches)
    }

    pub fn record(&self, pid: u64) -> Option<&ProcessRecord> {
        self.records.iter().find(|r| r.id == pid)
    }
}

/// A scheduling policy that can replay a workload from scratch.
///
/// `run` builds fresh records from `jobs` every call, so the same scheduler
/// and job list may be run any number of times.
pub trait Scheduler {
    fn name(&self) -> &'static str;

    fn run(&mut self, jobs: &[Job]) -> RunOutcome;
}

use super::{RunOutcome, Scheduler};
use crate::core::{Location, ProcessRecord};
use crate::sim::{Job, Slot, Timeline, job::sorted_by_arrival};

/// First come, first served. No preemption.
pub struct FcfsScheduler;

impl Scheduler for FcfsScheduler {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn run(&mut self, jobs: &[Job]) -> RunOutcome {
        let mut records: Vec<ProcessRecord> =
            sorted_by_arrival(jobs).iter().map(ProcessRecord::from_job).collect();
        let mut timeline = Timeline::new();
        let mut now = 0;
        let mut busy_ticks = 0;
        let mut context_switches = 0;

        for proc in &mut records {
            if now < proc.arrival_time {
                timeline.push_run(Slot::Idle, proc.arrival_time - now);
                now = proc.arrival_time;
            }

            proc.start_time = Some(now);
            timeline.push_run(
                Slot::Busy {
                    pid: proc.id,
                    level: 0,
                },
                proc.original_burst,
            );
            now += proc.original_burst;
            busy_ticks += proc.original_burst;
            context_switches += 1;

            proc.remaining_time = 0;
            proc.completion_time = Some(now);
            proc.location = Location::Completed;
        }

        RunOutcome {
            scheduler: self.name(),
            records,
            timeline,
            busy_ticks,
            context_switches,
        }
    }
}

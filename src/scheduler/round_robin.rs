use std::collections::VecDeque;
use std::num::NonZeroU64;

use super::{DEFAULT_RR_QUANTUM, RunOutcome, Scheduler};
use crate::core::{Location, ProcessRecord};
use crate::sim::{Job, Timeline, job::sorted_by_arrival};

/// Single flat FIFO with a fixed quantum.
pub struct RoundRobinScheduler {
    quantum: NonZeroU64,
}

impl RoundRobinScheduler {
    pub fn new(quantum: NonZeroU64) -> Self {
        Self { quantum }
    }

    pub fn quantum(&self) -> NonZeroU64 {
        self.quantum
    }
}

impl Default for RoundRobinScheduler {
    fn default() -> Self {
        Self::new(NonZeroU64::new(DEFAULT_RR_QUANTUM).expect("default quantum is non-zero"))
    }
}

impl Scheduler for RoundRobinScheduler {
    fn name(&self) -> &'static str {
        "Round Robin"
    }

    fn run(&mut self, jobs: &[Job]) -> RunOutcome {
        let mut records: Vec<ProcessRecord> =
            sorted_by_arrival(jobs).iter().map(ProcessRecord::from_job).collect();
        let mut ready: VecDeque<usize> = VecDeque::new();
        let mut running: Option<usize> = None;
        let mut timeline = Timeline::new();
        let mut next_arrival = 0;
        let mut completed = 0;
        let mut now = 0;
        let mut quantum_used = 0;
        let mut busy_ticks = 0;
        let mut context_switches = 0;

        while completed < records.len() {
            while next_arrival < records.len() && records[next_arrival].arrival_time <= now {
                records[next_arrival].location = Location::Waiting(0);
                ready.push_back(next_arrival);
                next_arrival += 1;
            }

            let index = match running {
                Some(index) => index,
                None => {
                    let Some(index) = ready.pop_front() else {
                        timeline.push_idle();
                        now += 1;
                        continue;
                    };
                    let proc = &mut records[index];
                    proc.location = Location::Running;
                    if proc.start_time.is_none() {
                        proc.start_time = Some(now);
                    }
                    quantum_used = 0;
                    context_switches += 1;
                    running = Some(index);
                    index
                }
            };

            let proc = &mut records[index];
            proc.remaining_time -= 1;
            quantum_used += 1;
            now += 1;
            busy_ticks += 1;
            timeline.push_busy(proc.id, 0);

            if proc.remaining_time == 0 {
                proc.completion_time = Some(now);
                proc.location = Location::Completed;
                completed += 1;
                running = None;
            } else if quantum_used >= self.quantum.get() {
                // Ahead of anything arriving at `now`
                proc.location = Location::Waiting(0);
                ready.push_back(index);
                running = None;
            }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn rr(quantum: u64) -> RoundRobinScheduler {
        RoundRobinScheduler::new(NonZeroU64::new(quantum).unwrap())
    }

    #[test]
    fn test_round_robin_rotates() {
        let jobs = [Job::new(1, 0, 5), Job::new(2, 0, 3)];
        let outcome = rr(2).run(&jobs);

        // 1 1 2 2 1 1 2 1
        assert_eq!(outcome.record(2).unwrap().completion_time, Some(7));
        assert_eq!(outcome.record(1).unwrap().completion_time, Some(8));
        assert_eq!(outcome.context_switches, 5);
    }

    #[test]
    fn test_expired_process_queues_before_same_tick_arrival() {
        let jobs = [Job::new(1, 0, 4), Job::new(2, 2, 1)];
        let outcome = rr(2).run(&jobs);

        // P1 expires at t=2 and is queued before P2, which arrives at t=2
        assert_eq!(outcome.record(1).unwrap().completion_time, Some(4));
        assert_eq!(outcome.record(2).unwrap().start_time, Some(4));
    }

    #[test]
    fn test_default_quantum() {
        assert_eq!(RoundRobinScheduler::default().quantum().get(), DEFAULT_RR_QUANTUM);
    }
}

use keyed_priority_queue::KeyedPriorityQueue;
use std::cmp::Ordering;

use super::{RunOutcome, Scheduler};
use crate::core::{Location, ProcessRecord, Ticks};
use crate::sim::{Job, Slot, Timeline, job::sorted_by_arrival};

/// Shortest job first, non-preemptive.
pub struct SjfScheduler;

// Position in arrival order; breaks burst ties
type Index = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShortestFirst {
    burst: Ticks,
    index: Index,
}

// KeyedPriorityQueue is a max-heap, so the shortest burst must compare greatest
impl Ord for ShortestFirst {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .burst
            .cmp(&self.burst)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for ShortestFirst {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Scheduler for SjfScheduler {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn run(&mut self, jobs: &[Job]) -> RunOutcome {
        let mut records: Vec<ProcessRecord> =
            sorted_by_arrival(jobs).iter().map(ProcessRecord::from_job).collect();
        let mut ready: KeyedPriorityQueue<Index, ShortestFirst> = KeyedPriorityQueue::new();
        let mut timeline = Timeline::new();
        let mut next_arrival = 0;
        let mut completed = 0;
        let mut now = 0;
        let mut busy_ticks = 0;
        let mut context_switches = 0;

        while completed < records.len() {
            while let Some(proc) = records.get(next_arrival) {
                if proc.arrival_time > now {
                    break;
                }
                let priority = ShortestFirst {
                    burst: proc.original_burst,
                    index: next_arrival,
                };
                ready.push(next_arrival, priority);
                next_arrival += 1;
            }

            let Some((index, _)) = ready.pop() else {
                timeline.push_idle();
                now += 1;
                continue;
            };

            let proc = &mut records[index];
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
            completed += 1;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sjf_picks_shortest_arrived() {
        let jobs = [Job::new(1, 0, 8), Job::new(2, 1, 3), Job::new(3, 2, 1)];
        let outcome = SjfScheduler.run(&jobs);

        assert_eq!(outcome.record(1).unwrap().completion_time, Some(8));
        assert_eq!(outcome.record(3).unwrap().completion_time, Some(9));
        assert_eq!(outcome.record(2).unwrap().completion_time, Some(12));
        assert_eq!(outcome.context_switches, 3);
    }

    #[test]
    fn test_sjf_ties_go_to_earlier_arrival() {
        let jobs = [Job::new(7, 0, 2), Job::new(5, 1, 3), Job::new(6, 1, 3)];
        let outcome = SjfScheduler.run(&jobs);

        assert_eq!(outcome.record(5).unwrap().start_time, Some(2));
        assert_eq!(outcome.record(6).unwrap().start_time, Some(5));
    }

    #[test]
    fn test_shortest_first_ordering() {
        let short = ShortestFirst { burst: 1, index: 4 };
        let long = ShortestFirst { burst: 5, index: 0 };
        let short_later = ShortestFirst { burst: 1, index: 6 };
        assert!(short > long);
        assert!(short > short_later);
    }
}

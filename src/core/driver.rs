use super::{
    config::SchedulerConfig,
    event::SimEvent,
    observer::Observer,
    state::{Level, Location, ProcKey, ProcTable, ProcessRecord, Ticks},
};
use crate::sim::{Job, Timeline, job::sorted_by_arrival};

/// Multilevel feedback queue engine, advanced one time unit per `step`.
pub struct Mlfq {
    pub table: ProcTable,
    config: SchedulerConfig,
    observer: Observer,
    timeline: Timeline,
    // Next job in arrival order still to be admitted
    arrival_cursor: usize,
    completed: usize,
    busy_ticks: Ticks,
    context_switches: u64,
    finished: bool,
}

impl Mlfq {
    pub fn new(jobs: &[Job], config: SchedulerConfig) -> Self {
        let jobs = sorted_by_arrival(jobs);
        let table = ProcTable::new(&jobs, config.num_levels());
        let finished = jobs.is_empty();
        Self {
            table,
            config,
            observer: Observer::new(),
            timeline: Timeline::new(),
            arrival_cursor: 0,
            completed: 0,
            busy_ticks: 0,
            context_switches: 0,
            finished,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Run one loop iteration and return what happened during it.
    ///
    /// An idle iteration only advances the clock by one unit and records an
    /// idle slot.
    pub fn step(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        self.admit_arrivals(&mut events);
        self.table.purge_finished();

        if self.config.is_aging_tick(self.table.now) {
            self.apply_aging(&mut events);
        }
        if self.config.is_boost_tick(self.table.now) {
            self.apply_boost(&mut events);
        }

        self.check_preemption(&mut events);

        let key = match self.table.running {
            Some(key) => key,
            None => match self.dispatch(&mut events) {
                Some(key) => key,
                None => {
                    if self.table.has_pending() {
                        self.timeline.push_idle();
                        self.table.advance_time(1);
                        events.push(SimEvent::CpuIdle);
                    } else {
                        self.finished = true;
                    }
                    self.observer.observe(&self.table);
                    return events;
                }
            },
        };

        self.execute(key);
        self.account_waiting();
        self.complete_or_demote(key, &mut events);

        self.table.advance_time(1);
        self.observer.observe(&self.table);
        if self.completed == self.table.order.len() {
            self.finished = true;
        }
        events
    }

    /// Step until every process has completed.
    pub fn run(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        while !self.finished {
            events.extend(self.step());
        }
        events
    }

    fn admit_arrivals(&mut self, events: &mut Vec<SimEvent>) {
        let now = self.table.now;
        // Contiguous, since the order is sorted by arrival
        while let Some(&key) = self.table.order.get(self.arrival_cursor) {
            let proc = self.table.proc(key);
            if proc.arrival_time != now {
                break;
            }
            self.arrival_cursor += 1;
            if proc.location != Location::Pending || proc.has_started() {
                continue;
            }
            let pid = proc.id;
            self.table.proc_mut(key).level = 0;
            self.table.enqueue_back(key);
            events.push(SimEvent::Arrived { pid });
        }
    }

    fn apply_aging(&mut self, events: &mut Vec<SimEvent>) {
        let threshold = self.config.aging_threshold;
        // Ascending, so a process moved into a level this sweep is not revisited
        for level in 1..self.config.num_levels() {
            let promoted = self
                .table
                .drain_where(level, |p| p.ticks_waiting_at_level >= threshold);
            for key in promoted {
                let proc = self.table.proc_mut(key);
                proc.reset_at_level(level - 1);
                let pid = proc.id;
                self.table.enqueue_back(key);
                events.push(SimEvent::Promoted {
                    pid,
                    from: level,
                    to: level - 1,
                });
            }
        }
    }

    fn apply_boost(&mut self, events: &mut Vec<SimEvent>) {
        let mut moved = Vec::new();
        for level in 1..self.config.num_levels() {
            for key in self.table.drain_where(level, |_| true) {
                let proc = self.table.proc_mut(key);
                proc.reset_at_level(0);
                moved.push(proc.id);
                self.table.enqueue_back(key);
            }
        }

        let mut running = None;
        if let Some(key) = self.table.running {
            let proc = self.table.proc_mut(key);
            if proc.level > 0 {
                proc.level = 0;
                proc.ticks_in_quantum = 0;
                running = Some(proc.id);
            }
        }

        events.push(SimEvent::Boosted { moved, running });
    }

    fn check_preemption(&mut self, events: &mut Vec<SimEvent>) {
        let Some(key) = self.table.running else {
            return;
        };
        let level = self.table.proc(key).level;
        if !self.table.queues.any_above(level) {
            return;
        }

        self.table.clear_running();
        // Head of its own level, quantum progress kept
        self.table.enqueue_front(key);
        self.context_switches += 1;
        events.push(SimEvent::Preempted {
            pid: self.table.proc(key).id,
            level,
        });
    }

    fn dispatch(&mut self, events: &mut Vec<SimEvent>) -> Option<ProcKey> {
        let level = self.table.queues.highest_ready()?;
        let key = self.table.dequeue(level)?;
        self.table.set_running(key);

        let now = self.table.now;
        let proc = self.table.proc_mut(key);
        let first_run = !proc.has_started();
        if first_run {
            proc.start_time = Some(now);
        }
        self.context_switches += 1;
        events.push(SimEvent::Dispatched {
            pid: proc.id,
            level,
            first_run,
        });
        Some(key)
    }

    fn execute(&mut self, key: ProcKey) {
        let proc = self.table.proc_mut(key);
        debug_assert!(proc.remaining_time > 0, "Process {} ran with no work", proc.id);
        proc.remaining_time -= 1;
        proc.ticks_in_quantum += 1;
        let (pid, level) = (proc.id, proc.level);
        self.busy_ticks += 1;
        self.timeline.push_busy(pid, level);
    }

    fn account_waiting(&mut self) {
        let waiting: Vec<ProcKey> = self.table.queues.iter().map(|(_, key)| key).collect();
        for key in waiting {
            let proc = self.table.proc_mut(key);
            if proc.remaining_time > 0 {
                proc.ticks_waiting_at_level += 1;
            }
        }
    }

    fn complete_or_demote(&mut self, key: ProcKey, events: &mut Vec<SimEvent>) {
        let now = self.table.now;
        let lowest = self.config.lowest_level();
        let proc = self.table.proc(key);
        let (pid, level) = (proc.id, proc.level);

        if proc.remaining_time == 0 {
            self.table.clear_running();
            self.table.mark_completed(key, now + 1);
            self.completed += 1;
            events.push(SimEvent::Completed {
                pid,
                level,
                at: now + 1,
            });
            return;
        }

        let quantum = self.config.quantum(level);
        if quantum == 0 || proc.ticks_in_quantum < quantum {
            return;
        }

        let next: Level = if level < lowest { level + 1 } else { level };
        self.table.clear_running();
        self.table.proc_mut(key).reset_at_level(next);
        self.table.enqueue_back(key);
        self.context_switches += 1;
        events.push(if next != level {
            SimEvent::Demoted {
                pid,
                from: level,
                to: next,
            }
        } else {
            SimEvent::Requeued { pid, level }
        });
    }

    pub fn now(&self) -> Ticks {
        self.table.now
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn busy_ticks(&self) -> Ticks {
        self.busy_ticks
    }

    pub fn context_switches(&self) -> u64 {
        self.context_switches
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Records in arrival order, equal arrivals as given.
    pub fn records(&self) -> Vec<ProcessRecord> {
        self.table.records()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Slot;

    fn config(
        quanta: Vec<Ticks>,
        aging: Ticks,
        aging_every: Ticks,
        boost: Ticks,
    ) -> SchedulerConfig {
        SchedulerConfig::new(quanta, aging, aging_every, boost).unwrap()
    }

    fn completion(engine: &Mlfq, pid: u64) -> Ticks {
        engine
            .records()
            .iter()
            .find(|r| r.id == pid)
            .and_then(|r| r.completion_time)
            .unwrap()
    }

    #[test]
    fn test_demotion_then_run_to_completion() {
        let jobs = [Job::new(1, 0, 10), Job::new(2, 0, 1)];
        let mut engine = Mlfq::new(&jobs, config(vec![2, 0], 3, 1, 1000));
        let events = engine.run();

        assert_eq!(completion(&engine, 2), 3);
        assert_eq!(completion(&engine, 1), 11);
        assert!(events.contains(&SimEvent::Demoted { pid: 1, from: 0, to: 1 }));
        // P1 dispatch, demote, P2 dispatch, P1 dispatch
        assert_eq!(engine.context_switches(), 4);
    }

    #[test]
    fn test_idle_ticks_are_recorded_one_by_one() {
        let jobs = [Job::new(1, 3, 2)];
        let mut engine = Mlfq::new(&jobs, SchedulerConfig::default());
        let events = engine.run();

        let idle = events.iter().filter(|e| **e == SimEvent::CpuIdle).count();
        assert_eq!(idle, 3);
        assert_eq!(engine.timeline().len(), 5);
        assert_eq!(engine.records()[0].start_time, Some(3));
        assert_eq!(completion(&engine, 1), 5);
    }

    #[test]
    fn test_preemption_keeps_quantum_progress() {
        // P1 drops to level 1 at t=2, runs one unit there, then P2 arrives at t=3
        let jobs = [Job::new(1, 0, 6), Job::new(2, 3, 1)];
        let mut engine = Mlfq::new(&jobs, config(vec![2, 3], 100, 100, 1000));

        for _ in 0..3 {
            engine.step();
        }
        let p1 = engine.table.order[0];
        assert_eq!(engine.table.proc(p1).level, 1);
        assert_eq!(engine.table.proc(p1).ticks_in_quantum, 1);

        let events = engine.step();
        assert!(events.contains(&SimEvent::Preempted { pid: 1, level: 1 }));
        assert_eq!(engine.table.proc(p1).ticks_in_quantum, 1);
        assert_eq!(engine.table.queues.level(1).front(), Some(&p1));

        // Resumed at t=4, two more units finish the level-1 quantum of 3
        engine.step();
        let events = engine.step();
        assert!(events.contains(&SimEvent::Requeued { pid: 1, level: 1 }));
        engine.run();
        assert_eq!(completion(&engine, 2), 4);
        assert_eq!(completion(&engine, 1), 7);
    }

    #[test]
    fn test_equal_level_arrival_does_not_preempt() {
        let jobs = [Job::new(1, 0, 3), Job::new(2, 1, 1)];
        let mut engine = Mlfq::new(&jobs, config(vec![5, 0], 100, 100, 1000));
        let events = engine.run();

        assert!(!events.iter().any(|e| matches!(e, SimEvent::Preempted { .. })));
        assert_eq!(completion(&engine, 1), 3);
        assert_eq!(completion(&engine, 2), 4);
    }

    #[test]
    fn test_aging_promotes_waiting_process() {
        // P1 hogs level 1 (run to completion); P2 waits at level 1 behind it
        let jobs = [Job::new(1, 0, 20), Job::new(2, 0, 4)];
        let mut engine = Mlfq::new(&jobs, config(vec![1, 0], 2, 2, 1000));
        let events = engine.run();

        let promoted = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Promoted { pid: 2, from: 1, to: 0 }))
            .count();
        assert!(promoted >= 1);
        assert!(!events.iter().any(|e| matches!(e, SimEvent::Promoted { pid: 1, .. })));
        assert!(completion(&engine, 2) < completion(&engine, 1));
    }

    #[test]
    fn test_boost_resets_running_process_in_place() {
        let jobs = [Job::new(1, 0, 8)];
        let mut engine = Mlfq::new(&jobs, config(vec![2, 0], 100, 100, 4));

        for _ in 0..4 {
            engine.step();
        }
        let p1 = engine.table.order[0];
        assert_eq!(engine.table.proc(p1).level, 1);

        let events = engine.step();
        assert!(events.contains(&SimEvent::Boosted {
            moved: vec![],
            running: Some(1)
        }));
        assert!(!events.iter().any(|e| matches!(e, SimEvent::Dispatched { .. })));
        assert_eq!(
            engine.timeline().slots().last(),
            Some(&Slot::Busy { pid: 1, level: 0 })
        );
    }

    #[test]
    fn test_boost_moves_waiting_levels_to_top_in_order() {
        // Unit quanta push all three down a level per turn; by t=5 P3 waits
        // in Q1 and P1, P2 wait in Q2
        let jobs = [Job::new(1, 0, 10), Job::new(2, 0, 10), Job::new(3, 0, 10)];
        let mut engine = Mlfq::new(&jobs, config(vec![1, 1, 0], 100, 100, 5));
        for _ in 0..5 {
            engine.step();
        }
        let [p1, p2, p3] = [0, 1, 2].map(|i| engine.table.order[i]);
        assert_eq!(engine.table.queues.level(1).iter().collect::<Vec<_>>(), vec![&p3]);
        assert_eq!(engine.table.queues.level(2).iter().collect::<Vec<_>>(), vec![&p1, &p2]);
        assert_eq!(engine.table.proc(p3).ticks_waiting_at_level, 2);
        assert_eq!(engine.table.proc(p1).ticks_waiting_at_level, 1);

        let events = engine.step();
        assert!(events.contains(&SimEvent::Boosted {
            moved: vec![3, 1, 2],
            running: None
        }));
        // Level 1 first, then level 2, each in FIFO order; P3 runs and drops again
        assert!(events.contains(&SimEvent::Dispatched {
            pid: 3,
            level: 0,
            first_run: false
        }));
        assert!(events.contains(&SimEvent::Demoted { pid: 3, from: 0, to: 1 }));
        assert_eq!(engine.table.queues.level(0).iter().collect::<Vec<_>>(), vec![&p1, &p2]);
        for key in [p1, p2] {
            let proc = engine.table.proc(key);
            assert_eq!(proc.level, 0);
            assert_eq!(proc.ticks_in_quantum, 0);
            // Cleared by the boost, then one tick spent queued behind P3
            assert_eq!(proc.ticks_waiting_at_level, 1);
        }
        assert!(engine.table.queues.level(2).is_empty());
    }

    #[test]
    fn test_equal_arrivals_admitted_in_input_order() {
        let jobs = [Job::new(2, 0, 3), Job::new(1, 0, 3)];
        let mut engine = Mlfq::new(&jobs, SchedulerConfig::default());
        engine.run();

        assert_eq!(completion(&engine, 2), 3);
        assert_eq!(completion(&engine, 1), 6);
        let ids: Vec<_> = engine.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_empty_input_finishes_immediately() {
        let mut engine = Mlfq::new(&[], SchedulerConfig::default());
        assert!(engine.is_finished());
        assert!(engine.run().is_empty());
        assert!(engine.timeline().is_empty());
    }
}

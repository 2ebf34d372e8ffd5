use serde::Serialize;
use slotmap::{SlotMap, new_key_type};
use std::collections::VecDeque;

use crate::sim::job::Job;

pub type Pid = u64;
pub type Ticks = u64;
// Queue index, 0 is the highest priority
pub type Level = usize;

new_key_type! {
    pub struct ProcKey;
}

/// Where a record currently lives. Exactly one of these at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Location {
    Pending,
    Waiting(Level),
    Running,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub id: Pid,
    pub arrival_time: Ticks,
    pub original_burst: Ticks,
    pub remaining_time: Ticks,
    pub level: Level,
    pub start_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
    pub ticks_in_quantum: Ticks,
    pub ticks_waiting_at_level: Ticks,
    pub location: Location,
}

impl ProcessRecord {
    pub fn from_job(job: &Job) -> Self {
        Self {
            id: job.id,
            arrival_time: job.arrival_time,
            original_burst: job.burst,
            remaining_time: job.burst,
            level: 0,
            start_time: None,
            completion_time: None,
            ticks_in_quantum: 0,
            ticks_waiting_at_level: 0,
            location: Location::Pending,
        }
    }

    pub fn has_started(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completion_time.is_some()
    }

    pub fn turnaround(&self) -> Option<Ticks> {
        self.completion_time.map(|c| c - self.arrival_time)
    }

    pub fn waiting(&self) -> Option<Ticks> {
        self.turnaround().map(|t| t - self.original_burst)
    }

    /// Move to `level` with both counters cleared.
    pub(crate) fn reset_at_level(&mut self, level: Level) {
        self.level = level;
        self.ticks_in_quantum = 0;
        self.ticks_waiting_at_level = 0;
    }
}

/// One FIFO per level.
#[derive(Debug)]
pub struct ReadyQueues {
    levels: Vec<VecDeque<ProcKey>>,
}

impl ReadyQueues {
    pub fn new(num_levels: usize) -> Self {
        Self {
            levels: (0..num_levels).map(|_| VecDeque::new()).collect(),
        }
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, level: Level) -> &VecDeque<ProcKey> {
        &self.levels[level]
    }

    /// First non-empty level, scanning from the top.
    pub fn highest_ready(&self) -> Option<Level> {
        self.levels.iter().position(|q| !q.is_empty())
    }

    pub fn any_above(&self, level: Level) -> bool {
        self.levels[..level].iter().any(|q| !q.is_empty())
    }

    pub fn contains(&self, key: ProcKey) -> bool {
        self.levels.iter().any(|q| q.contains(&key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, ProcKey)> + '_ {
        self.levels
            .iter()
            .enumerate()
            .flat_map(|(level, q)| q.iter().map(move |&key| (level, key)))
    }

    fn push_back(&mut self, level: Level, key: ProcKey) {
        self.levels[level].push_back(key);
    }

    fn push_front(&mut self, level: Level, key: ProcKey) {
        self.levels[level].push_front(key);
    }

    fn pop_front(&mut self, level: Level) -> Option<ProcKey> {
        self.levels[level].pop_front()
    }

    fn take_level(&mut self, level: Level) -> VecDeque<ProcKey> {
        std::mem::take(&mut self.levels[level])
    }

    fn restore_level(&mut self, level: Level, keys: VecDeque<ProcKey>) {
        debug_assert!(self.levels[level].is_empty());
        self.levels[level] = keys;
    }
}

/// Process arena, ready queues and the running slot of a single MLFQ run.
///
/// Handles move between the queues and the running slot through the methods
/// below, which keep `ProcessRecord::location` in step.
#[derive(Debug)]
pub struct ProcTable {
    pub now: Ticks,
    pub procs: SlotMap<ProcKey, ProcessRecord>,
    pub queues: ReadyQueues,
    pub running: Option<ProcKey>,
    // Keys in arrival order
    pub order: Vec<ProcKey>,
}

impl ProcTable {
    pub fn new(jobs: &[Job], num_levels: usize) -> Self {
        let mut procs = SlotMap::with_capacity_and_key(jobs.len());
        let order = jobs
            .iter()
            .map(|job| procs.insert(ProcessRecord::from_job(job)))
            .collect();

        Self {
            now: 0,
            procs,
            queues: ReadyQueues::new(num_levels),
            running: None,
            order,
        }
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn proc(&self, key: ProcKey) -> &ProcessRecord {
        &self.procs[key]
    }

    pub fn proc_mut(&mut self, key: ProcKey) -> &mut ProcessRecord {
        &mut self.procs[key]
    }

    pub fn running_proc(&self) -> Option<&ProcessRecord> {
        self.running.map(|key| self.proc(key))
    }

    fn enqueue(&mut self, key: ProcKey, front: bool) {
        debug_assert!(!self.queues.contains(key), "Process already queued");
        let proc = &mut self.procs[key];
        debug_assert!(
            proc.location != Location::Completed,
            "Completed process {} enqueued",
            proc.id
        );
        let level = proc.level;
        proc.location = Location::Waiting(level);
        if front {
            self.queues.push_front(level, key);
        } else {
            self.queues.push_back(level, key);
        }
    }

    /// Append to the tail of the record's current level.
    pub fn enqueue_back(&mut self, key: ProcKey) {
        self.enqueue(key, false);
    }

    /// Put back at the head of the record's current level.
    pub fn enqueue_front(&mut self, key: ProcKey) {
        self.enqueue(key, true);
    }

    pub fn dequeue(&mut self, level: Level) -> Option<ProcKey> {
        let key = self.queues.pop_front(level)?;
        debug_assert_eq!(self.procs[key].location, Location::Waiting(level));
        Some(key)
    }

    pub fn set_running(&mut self, key: ProcKey) {
        assert!(
            self.running.is_none(),
            "CPU already running process {:?}",
            self.running_proc().map(|p| p.id)
        );
        let proc = &mut self.procs[key];
        debug_assert!(
            matches!(proc.location, Location::Waiting(_)),
            "Process {} dispatched from {:?}",
            proc.id,
            proc.location
        );
        proc.location = Location::Running;
        self.running = Some(key);
    }

    /// Vacate the running slot. The caller decides where the handle goes next.
    pub fn clear_running(&mut self) -> Option<ProcKey> {
        self.running.take()
    }

    pub fn mark_completed(&mut self, key: ProcKey, completion_time: Ticks) {
        debug_assert!(self.running != Some(key), "Completing a process still on CPU");
        let proc = &mut self.procs[key];
        debug_assert_eq!(proc.remaining_time, 0);
        proc.location = Location::Completed;
        proc.completion_time = Some(completion_time);
    }

    /// Drop queued handles whose records have no work left.
    pub fn purge_finished(&mut self) -> usize {
        let mut purged = 0;
        for level in 0..self.queues.num_levels() {
            let mut keys = self.queues.take_level(level);
            let before = keys.len();
            keys.retain(|&key| self.procs[key].remaining_time > 0);
            purged += before - keys.len();
            self.queues.restore_level(level, keys);
        }
        purged
    }

    /// Remove and return the handles of `level` matching `pred`, keeping the
    /// relative order of both the removed and the remaining handles. The caller
    /// must enqueue every returned handle again.
    pub fn drain_where(
        &mut self,
        level: Level,
        mut pred: impl FnMut(&ProcessRecord) -> bool,
    ) -> Vec<ProcKey> {
        let keys = self.queues.take_level(level);
        let (taken, kept): (VecDeque<_>, VecDeque<_>) =
            keys.into_iter().partition(|&key| pred(&self.procs[key]));
        self.queues.restore_level(level, kept);
        taken.into()
    }

    pub fn has_pending(&self) -> bool {
        self.procs
            .values()
            .any(|p| p.location == Location::Pending && p.remaining_time > 0)
    }

    pub fn records(&self) -> Vec<ProcessRecord> {
        self.order.iter().map(|&key| self.procs[key].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ProcTable {
        let jobs = [Job::new(1, 0, 3), Job::new(2, 0, 2), Job::new(3, 0, 1)];
        let mut table = ProcTable::new(&jobs, 3);
        let keys = table.order.clone();
        for key in keys {
            table.enqueue_back(key);
        }
        table
    }

    #[test]
    fn test_dispatch_moves_handle_out_of_queue() {
        let mut table = table();
        let key = table.dequeue(0).unwrap();
        table.set_running(key);

        assert_eq!(table.proc(key).location, Location::Running);
        assert!(!table.queues.contains(key));
        assert_eq!(table.queues.level(0).len(), 2);
    }

    #[test]
    fn test_enqueue_front_keeps_existing_order() {
        let mut table = table();
        let first = table.dequeue(0).unwrap();
        table.set_running(first);
        table.clear_running();
        table.enqueue_front(first);

        let ids: Vec<_> = table.queues.level(0).iter().map(|&k| table.proc(k).id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_drain_where_preserves_order() {
        let mut table = table();
        let taken = table.drain_where(0, |p| p.id != 2);
        let taken: Vec<_> = taken.iter().map(|&k| table.proc(k).id).collect();
        let kept: Vec<_> = table.queues.level(0).iter().map(|&k| table.proc(k).id).collect();

        assert_eq!(taken, vec![1, 3]);
        assert_eq!(kept, vec![2]);
    }

    #[test]
    fn test_purge_finished() {
        let mut table = table();
        let key = table.order[1];
        table.proc_mut(key).remaining_time = 0;

        assert_eq!(table.purge_finished(), 1);
        assert!(!table.queues.contains(key));
    }

    #[test]
    fn test_highest_ready_and_any_above() {
        let mut queues = ReadyQueues::new(3);
        assert_eq!(queues.highest_ready(), None);

        let mut arena: SlotMap<ProcKey, ()> = SlotMap::with_key();
        let key = arena.insert(());
        queues.push_back(2, key);
        assert_eq!(queues.highest_ready(), Some(2));
        assert!(!queues.any_above(2));

        queues.push_back(1, arena.insert(()));
        assert!(queues.any_above(2));
        assert!(!queues.any_above(1));
    }
}

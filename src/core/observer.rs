use super::state::{Location, ProcTable};

/// Checks the arena/queue exclusivity invariants after every tick.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, table: &ProcTable) {
        self.step += 1;

        if let Some(key) = table.running {
            let proc = table.proc(key);
            debug_assert_eq!(
                proc.location,
                Location::Running,
                "running slot holds process {} in {:?}",
                proc.id,
                proc.location
            );
            debug_assert!(
                !table.queues.contains(key),
                "Running process {} must not appear in any queue",
                proc.id
            );
        }

        let mut queued = 0;
        for (level, key) in table.queues.iter() {
            queued += 1;
            let proc = table.proc(key);
            debug_assert_eq!(
                proc.location,
                Location::Waiting(level),
                "Process {} queued at {level} but tagged {:?}",
                proc.id,
                proc.location
            );
            debug_assert_eq!(proc.level, level, "Process {} level mismatch", proc.id);
        }

        let waiting = table
            .procs
            .values()
            .filter(|p| matches!(p.location, Location::Waiting(_)))
            .count();
        debug_assert_eq!(waiting, queued, "Waiting processes must be queued exactly once");

        for proc in table.procs.values() {
            debug_assert!(
                proc.remaining_time <= proc.original_burst,
                "Process {} remaining exceeds burst",
                proc.id
            );
            debug_assert!(
                proc.level < table.queues.num_levels(),
                "Process {} level {} out of range",
                proc.id,
                proc.level
            );
            debug_assert_eq!(
                proc.location == Location::Completed,
                proc.remaining_time == 0,
                "Process {} completion state mismatch",
                proc.id
            );
        }
    }
}

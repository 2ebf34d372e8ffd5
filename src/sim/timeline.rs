//! Per-unit execution record of a run

use serde::Serialize;

use crate::core::{Level, Pid, Ticks};

/// What the CPU did during one time unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Slot {
    Idle,
    Busy { pid: Pid, level: Level },
}

/// Maximal run of identical slots, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub slot: Slot,
    pub start: Ticks,
    pub end: Ticks,
}

impl Segment {
    pub fn len(&self) -> Ticks {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timeline {
    slots: Vec<Slot>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_busy(&mut self, pid: Pid, level: Level) {
        self.slots.push(Slot::Busy { pid, level });
    }

    pub fn push_idle(&mut self) {
        self.slots.push(Slot::Idle);
    }

    pub fn push_run(&mut self, slot: Slot, ticks: Ticks) {
        self.slots
            .extend(std::iter::repeat_n(slot, ticks as usize));
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn busy_ticks(&self) -> Ticks {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Busy { .. }))
            .count() as Ticks
    }

    pub fn ticks_for(&self, pid: Pid) -> Ticks {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Busy { pid: p, .. } if *p == pid))
            .count() as Ticks
    }

    /// Busy units spent at each level.
    pub fn level_usage(&self, num_levels: usize) -> Vec<Ticks> {
        let mut usage = vec![0; num_levels];
        for slot in &self.slots {
            if let Slot::Busy { level, .. } = slot {
                if let Some(count) = usage.get_mut(*level) {
                    *count += 1;
                }
            }
        }
        usage
    }

    /// Collapse into Gantt segments.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();
        for (t, &slot) in self.slots.iter().enumerate() {
            let t = t as Ticks;
            match segments.last_mut() {
                Some(last) if last.slot == slot => last.end = t + 1,
                _ => segments.push(Segment {
                    slot,
                    start: t,
                    end: t + 1,
                }),
            }
        }
        segments
    }
}

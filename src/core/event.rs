use serde::Serialize;

use crate::core::{Level, Pid, Ticks};

/// Transitions emitted by one engine tick, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SimEvent {
    Arrived {
        pid: Pid,
    },
    // Aging moved a waiting process up one level
    Promoted {
        pid: Pid,
        from: Level,
        to: Level,
    },
    Boosted {
        moved: Vec<Pid>,
        running: Option<Pid>,
    },
    Preempted {
        pid: Pid,
        level: Level,
    },
    Dispatched {
        pid: Pid,
        level: Level,
        first_run: bool,
    },
    // Quantum exhausted above the lowest level
    Demoted {
        pid: Pid,
        from: Level,
        to: Level,
    },
    // Quantum exhausted at the lowest level
    Requeued {
        pid: Pid,
        level: Level,
    },
    Completed {
        pid: Pid,
        level: Level,
        at: Ticks,
    },
    CpuIdle,
}

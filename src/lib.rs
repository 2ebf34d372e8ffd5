//! Discrete-time single-CPU scheduling simulator.
//!
//! [`core::Mlfq`] advances a multilevel feedback queue one time unit per
//! step; [`scheduler`] wraps it and the FCFS, SJF and Round-Robin baselines
//! behind one trait so [`sim::Comparison`] can replay a workload on each.

pub mod core;
pub mod error;
pub mod input;
pub mod scheduler;
pub mod sim;

pub use crate::core::{Mlfq, ProcessRecord, SchedulerConfig, SimEvent};
pub use error::{Result, SimError};
pub use scheduler::{RunOutcome, Scheduler};
pub use sim::{Comparison, Job, Metrics, Slot, Timeline};

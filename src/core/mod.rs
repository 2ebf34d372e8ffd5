pub mod config;
pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use config::SchedulerConfig;
pub use driver::Mlfq;
pub use event::SimEvent;
pub use state::{Level, Location, Pid, ProcKey, ProcTable, ProcessRecord, ReadyQueues, Ticks};

pub mod driver;
pub mod job;
pub mod metrics;
pub mod timeline;
pub mod workload;

pub use driver::{Comparison, ComparisonEntry};
pub use job::Job;
pub use metrics::Metrics;
pub use timeline::{Segment, Slot, Timeline};

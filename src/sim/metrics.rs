//! Aggregate performance figures of a finished run

use average::{Estimate, Mean};
use serde::Serialize;

use crate::core::{ProcessRecord, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub avg_turnaround: f64,
    pub avg_waiting: f64,
    /// Processes per time unit
    pub throughput: f64,
    /// Percent of elapsed time the CPU was busy
    pub cpu_utilization: f64,
    pub context_switches: u64,
}

impl Metrics {
    /// Records without a completion time count as completing at their arrival.
    pub fn compute(records: &[ProcessRecord], busy_ticks: Ticks, context_switches: u64) -> Self {
        let turnarounds = records.iter().map(|r| r.turnaround().unwrap_or(0) as f64);
        let waits = records.iter().map(|r| {
            r.turnaround().unwrap_or(0) as f64 - r.original_burst as f64
        });
        let last_completion = records
            .iter()
            .filter_map(|r| r.completion_time)
            .max()
            .unwrap_or(0)
            .max(1) as f64;

        Self {
            avg_turnaround: avg(turnarounds),
            avg_waiting: avg(waits),
            throughput: records.len() as f64 / last_completion,
            cpu_utilization: 100.0 * busy_ticks as f64 / last_completion,
            context_switches,
        }
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Job;

    fn completed(id: u64, arrival: Ticks, burst: Ticks, completion: Ticks) -> ProcessRecord {
        let mut record = ProcessRecord::from_job(&Job::new(id, arrival, burst));
        record.remaining_time = 0;
        record.completion_time = Some(completion);
        record
    }

    #[test]
    fn test_metrics_formulas() {
        let records = [completed(1, 0, 5, 5), completed(2, 1, 3, 8)];
        let metrics = Metrics::compute(&records, 8, 2);

        assert_eq!(metrics.avg_turnaround, 6.0);
        assert_eq!(metrics.avg_waiting, 2.0);
        assert_eq!(metrics.throughput, 0.25);
        assert_eq!(metrics.cpu_utilization, 100.0);
        assert_eq!(metrics.context_switches, 2);
    }

    #[test]
    fn test_empty_run_is_degenerate_not_nan() {
        let metrics = Metrics::compute(&[], 0, 0);
        assert_eq!(metrics.avg_turnaround, 0.0);
        assert_eq!(metrics.avg_waiting, 0.0);
        assert_eq!(metrics.throughput, 0.0);
        assert_eq!(metrics.cpu_utilization, 0.0);
    }

    #[test]
    fn test_idle_lowers_utilization() {
        let records = [completed(1, 4, 2, 6)];
        let metrics = Metrics::compute(&records, 2, 1);
        assert!((metrics.cpu_utilization - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(metrics.avg_waiting, 0.0);
    }
}

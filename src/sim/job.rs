use serde::Serialize;

use crate::core::state::{Pid, Ticks};
use crate::error::{Result, SimError};

/// Immutable input triple. Every engine run derives its own records from these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: Pid,
    pub arrival_time: Ticks,
    pub burst: Ticks,
}

impl Job {
    pub fn new(id: Pid, arrival_time: Ticks, burst: Ticks) -> Self {
        Self {
            id,
            arrival_time,
            burst,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.burst == 0 {
            return Err(SimError::InvalidJob {
                id: self.id,
                reason: "burst must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Arrival ordering shared by every engine. Equal arrivals keep input order.
pub fn sorted_by_arrival(jobs: &[Job]) -> Vec<Job> {
    let mut jobs = jobs.to_vec();
    jobs.sort_by_key(|job| job.arrival_time);
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_burst_rejected() {
        assert!(Job::new(1, 0, 0).validate().is_err());
        assert!(Job::new(1, 0, 1).validate().is_ok());
    }

    #[test]
    fn test_sorted_by_arrival_keeps_input_order_on_ties() {
        let jobs = [Job::new(3, 2, 1), Job::new(2, 0, 4), Job::new(1, 2, 5)];
        let ids: Vec<_> = sorted_by_arrival(&jobs).iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}

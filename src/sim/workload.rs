use rand::prelude::*;

use super::Job;
use crate::core::Ticks;

/// Bernoulli arrivals over `ticks`: each tick spawns a job with probability
/// `p_arrival`, short with probability `p_short`.
pub fn bernoulli_jobs(
    ticks: Ticks,
    p_arrival: f64,
    p_short: f64,
    short_ticks: Ticks,
    long_ticks: Ticks,
    seed: u64,
) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let burst = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };

            jobs.push(Job {
                id: jobs.len() as u64 + 1,
                arrival_time: t,
                burst,
            });
        }
    }

    jobs
}

/// `count` jobs with uniform arrivals in `0..spread` and bursts in `1..=max_burst`.
pub fn uniform_jobs(count: usize, spread: Ticks, max_burst: Ticks, seed: u64) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| Job {
            id: i as u64 + 1,
            arrival_time: rng.random_range(0..spread.max(1)),
            burst: rng.random_range(1..=max_burst.max(1)),
        })
        .collect()
}

use serde::Serialize;

use super::state::{Level, Ticks};
use crate::error::{Result, SimError};

/// Immutable parameters of an MLFQ run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerConfig {
    /// Quantum per level; 0 runs a dispatched process to completion.
    quanta: Vec<Ticks>,
    /// Cosmetic per-level names
    labels: Vec<String>,
    /// Ticks waiting at a non-top level before promotion
    pub aging_threshold: Ticks,
    /// Ticks between aging sweeps
    pub aging_check_interval: Ticks,
    /// Ticks between global resets to level 0
    pub boost_interval: Ticks,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quanta: vec![4, 8, 0],
            labels: vec!["Round-Robin".into(), "Round-Robin".into(), "FCFS".into()],
            aging_threshold: 15,
            aging_check_interval: 3,
            boost_interval: 50,
        }
    }
}

impl SchedulerConfig {
    pub fn new(
        quanta: Vec<Ticks>,
        aging_threshold: Ticks,
        aging_check_interval: Ticks,
        boost_interval: Ticks,
    ) -> Result<Self> {
        let labels = quanta.iter().map(|&q| default_label(q).to_string()).collect();
        let config = Self {
            quanta,
            labels,
            aging_threshold,
            aging_check_interval,
            boost_interval,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Result<Self> {
        if labels.len() != self.quanta.len() {
            return Err(SimError::config(format!(
                "{} labels for {} levels",
                labels.len(),
                self.quanta.len()
            )));
        }
        self.labels = labels;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.quanta.is_empty() {
            return Err(SimError::config("at least one level is required"));
        }
        if self.aging_threshold == 0 {
            return Err(SimError::config("aging threshold must be positive"));
        }
        if self.aging_check_interval == 0 {
            return Err(SimError::config("aging check interval must be positive"));
        }
        if self.boost_interval == 0 {
            return Err(SimError::config("boost interval must be positive"));
        }
        Ok(())
    }

    pub fn num_levels(&self) -> usize {
        self.quanta.len()
    }

    pub fn lowest_level(&self) -> Level {
        self.quanta.len() - 1
    }

    pub fn quantum(&self, level: Level) -> Ticks {
        self.quanta[level]
    }

    pub fn quanta(&self) -> &[Ticks] {
        &self.quanta
    }

    pub fn label(&self, level: Level) -> &str {
        &self.labels[level]
    }

    pub fn is_aging_tick(&self, now: Ticks) -> bool {
        now > 0 && now % self.aging_check_interval == 0
    }

    pub fn is_boost_tick(&self, now: Ticks) -> bool {
        now > 0 && now % self.boost_interval == 0
    }
}

fn default_label(quantum: Ticks) -> &'static str {
    if quantum == 0 { "FCFS" } else { "Round-Robin" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.num_levels(), 3);
        assert_eq!(config.quanta(), &[4, 8, 0]);
        assert_eq!(config.label(2), "FCFS");
        assert_eq!(config.lowest_level(), 2);
    }

    #[test]
    fn test_rejects_degenerate_values() {
        assert!(SchedulerConfig::new(vec![], 1, 1, 1).is_err());
        assert!(SchedulerConfig::new(vec![2], 0, 1, 1).is_err());
        assert!(SchedulerConfig::new(vec![2], 1, 0, 1).is_err());
        assert!(SchedulerConfig::new(vec![2], 1, 1, 0).is_err());
        assert!(SchedulerConfig::new(vec![0], 1, 1, 1).is_ok());
    }

    #[test]
    fn test_label_count_must_match() {
        let config = SchedulerConfig::new(vec![2, 0], 3, 1, 100).unwrap();
        assert!(config.clone().with_labels(vec!["RR".into()]).is_err());
        let config = config.with_labels(vec!["RR".into(), "FIFO".into()]).unwrap();
        assert_eq!(config.label(1), "FIFO");
    }

    #[test]
    fn test_periodic_ticks_skip_zero() {
        let config = SchedulerConfig::default();
        assert!(!config.is_aging_tick(0));
        assert!(config.is_aging_tick(3));
        assert!(!config.is_aging_tick(4));
        assert!(!config.is_boost_tick(0));
        assert!(config.is_boost_tick(100));
    }
}

//! Text formats for process lists and scheduler configuration
//!
//! Process list: a count `N` followed by `N` triples `id arrival burst`, all
//! whitespace separated.
//!
//! Configuration:
//!
//! ```text
//! 3
//! 4 8 0
//! Round-Robin
//! Round-Robin
//! FCFS
//! 15 3 50
//! ```
//!
//! i.e. the level count, one quantum per level, one label line per level,
//! then aging threshold, aging check interval and boost interval.

use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::SchedulerConfig;
use crate::error::{Result, SimError};
use crate::sim::Job;

/// Where the configuration of a run came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The file was requested but could not be used
    Fallback { path: PathBuf, reason: String },
    Default,
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
            position: 0,
        }
    }

    fn next_u64(&mut self, what: &'static str) -> Result<u64> {
        let token = self.inner.next().ok_or(SimError::Truncated(what))?;
        self.position += 1;
        parse_u64(token, self.position, what)
    }
}

fn parse_u64(token: &str, position: usize, expected: &'static str) -> Result<u64> {
    token.parse().map_err(|_| SimError::Parse {
        token: token.to_string(),
        position,
        expected,
    })
}

pub fn parse_jobs(text: &str) -> Result<Vec<Job>> {
    let mut tokens = Tokens::new(text);
    let count = tokens.next_u64("process count")?;

    let mut jobs = Vec::new();
    for _ in 0..count {
        let id = tokens.next_u64("process id")?;
        let arrival_time = tokens.next_u64("arrival time")?;
        let burst = tokens.next_u64("burst time")?;
        jobs.push(Job::new(id, arrival_time, burst));
    }

    validate_jobs(&jobs)?;
    Ok(jobs)
}

/// Non-empty, positive bursts, unique ids.
pub fn validate_jobs(jobs: &[Job]) -> Result<()> {
    if jobs.is_empty() {
        return Err(SimError::NoProcesses);
    }

    let mut seen = FxHashSet::default();
    for job in jobs {
        job.validate()?;
        if !seen.insert(job.id) {
            return Err(SimError::InvalidJob {
                id: job.id,
                reason: "duplicate process id".into(),
            });
        }
    }
    Ok(())
}

pub fn parse_config(text: &str) -> Result<SchedulerConfig> {
    let mut lines = text.lines();
    let mut position = 0;
    let mut num_levels: Option<usize> = None;
    let mut quanta = Vec::new();

    // Level count and quanta may share or span lines; labels start on the
    // line after the last quantum.
    while num_levels.is_none_or(|n| quanta.len() < n) {
        let line = lines.next().ok_or(match num_levels {
            None => SimError::Truncated("level count"),
            Some(_) => SimError::Truncated("level quantum"),
        })?;
        for token in line.split_whitespace() {
            position += 1;
            match num_levels {
                None => num_levels = Some(parse_u64(token, position, "level count")? as usize),
                Some(n) if quanta.len() < n => {
                    quanta.push(parse_u64(token, position, "level quantum")?)
                }
                Some(_) => break,
            }
        }
    }

    let num_levels = num_levels.unwrap_or_default();
    let mut labels = Vec::new();
    for _ in 0..num_levels {
        let line = lines.next().ok_or(SimError::Truncated("level label"))?;
        labels.push(line.trim().to_string());
    }

    let rest: Vec<&str> = lines.collect();
    let rest = rest.join("\n");
    let mut tokens = Tokens::new(&rest);
    let aging_threshold = tokens.next_u64("aging threshold")?;
    let aging_check_interval = tokens.next_u64("aging check interval")?;
    let boost_interval = tokens.next_u64("boost interval")?;

    SchedulerConfig::new(quanta, aging_threshold, aging_check_interval, boost_interval)?
        .with_labels(labels)
}

pub fn load_jobs(path: &Path) -> Result<Vec<Job>> {
    let text = fs::read_to_string(path)?;
    parse_jobs(&text)
}

pub fn load_config(path: &Path) -> Result<SchedulerConfig> {
    let text = fs::read_to_string(path)?;
    parse_config(&text)
}

/// Load `path` if given, falling back to the built-in defaults on any error.
pub fn load_config_or_default(path: Option<&Path>) -> (SchedulerConfig, ConfigSource) {
    let Some(path) = path else {
        return (SchedulerConfig::default(), ConfigSource::Default);
    };

    match load_config(path) {
        Ok(config) => {
            info!(path = %path.display(), "configuration loaded");
            (config, ConfigSource::File(path.to_path_buf()))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "using default configuration");
            (
                SchedulerConfig::default(),
                ConfigSource::Fallback {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                },
            )
        }
    }
}

//! Error types for the simulator

use thiserror::Error;

/// Simulator result type
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised while loading input or building a run.
///
/// Engine invariants are asserted, not reported here: once a run is built it
/// cannot fail.
#[derive(Error, Debug)]
pub enum SimError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A token that should have been a non-negative integer
    #[error("expected {expected} at token {position}, found {token:?}")]
    Parse {
        token: String,
        position: usize,
        expected: &'static str,
    },

    /// Input ended before a required value
    #[error("input ended early: missing {0}")]
    Truncated(&'static str),

    /// Scheduler configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A job that cannot be simulated
    #[error("invalid job {id}: {reason}")]
    InvalidJob { id: u64, reason: String },

    /// Process list parsed but empty
    #[error("no processes found")]
    NoProcesses,
}

impl SimError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

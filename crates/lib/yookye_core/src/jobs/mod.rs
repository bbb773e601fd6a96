//! Job submission & polling state machine.
//!
//! A submitted preference form may launch a remote recommendation job;
//! this module watches such a job until it reaches a terminal state,
//! fetches the result, and reports progress along the way. Polling is
//! bounded: the watcher always terminates within `max_attempts` ticks.

mod poller;
mod status;

pub use poller::{submit_and_watch, JobEvent, JobPoller, PollHandle};
pub use status::JobStatus;

use std::time::Duration;

use thiserror::Error;

/// Terminal polling failures, as seen by a caller draining a watcher.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job (or a status/result call) failed; the message is surfaced
    /// to the user verbatim.
    #[error("Job failed: {0}")]
    Failed(String),

    /// The attempt bound was exhausted before a terminal status. Distinct
    /// from a hard failure: the job may still complete server-side.
    #[error("Timed out after {attempts} status checks; the search is taking longer than expected")]
    Timeout { attempts: u32 },

    /// The watcher was cancelled before reaching a terminal state.
    #[error("Polling cancelled")]
    Cancelled,
}

/// Polling schedule and bounds.
///
/// Defaults follow the observed contract: a 2 s early probe, a 15 s
/// fixed-rate interval, and at most 20 attempts (~5 minutes). Tests
/// substitute millisecond values.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Fixed-rate interval between status checks.
    pub interval: Duration,
    /// Delay before the single early out-of-band probe.
    pub probe_delay: Duration,
    /// Maximum status checks before giving up with a timeout.
    pub max_attempts: u32,
    /// Consecutive transient network failures tolerated per poll loop
    /// before declaring the job failed. 0 means any network error during
    /// polling is terminal.
    pub network_retries: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            probe_delay: Duration::from_secs(2),
            max_attempts: 20,
            network_retries: 0,
        }
    }
}

//! The polling worker.
//!
//! One spawned task per watched job drives the early probe and the
//! fixed-rate interval loop. Every await point races the cancellation
//! token and every emit re-checks it, so teardown is immediate and no
//! late response mutates state or reaches the caller afterwards.

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{JobError, JobStatus, PollPolicy};
use crate::api::ApiError;
use crate::models::travel::{SubmitFormResponse, TravelForm};
use crate::travel::{TravelApi, TravelError};

/// Progress shown right after a successful early probe.
const PROBE_PROGRESS: u8 = 20;

/// Events emitted while a job is being watched.
///
/// `progress` is a synthetic estimate: monotonic and capped below 100
/// until a terminal state, because the server reports no true progress.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// A non-terminal status observation.
    Status {
        status: JobStatus,
        attempt: u32,
        progress: u8,
    },
    /// Terminal success; carries the fetched result payload.
    Done { result: serde_json::Value },
    /// Terminal failure with a human-readable message.
    Failed { message: String },
    /// The attempt bound was exhausted before a terminal status.
    TimedOut { attempts: u32 },
}

/// Handle to a running watcher. Dropping it cancels polling, so a
/// watcher can never outlive the view that started it; re-creating a
/// watcher for the same job therefore never stacks a second poller.
#[derive(Debug)]
pub struct PollHandle {
    events: mpsc::UnboundedReceiver<JobEvent>,
    cancel: CancellationToken,
}

impl PollHandle {
    /// Next event, or `None` once the worker has stopped.
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        self.events.recv().await
    }

    /// Stop polling. Idempotent. Nothing is emitted after this returns;
    /// events already queued may still be drained.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drain events until a terminal one and fold it into a result.
    pub async fn wait(mut self) -> Result<serde_json::Value, JobError> {
        while let Some(event) = self.events.recv().await {
            match event {
                JobEvent::Status { .. } => continue,
                JobEvent::Done { result } => return Ok(result),
                JobEvent::Failed { message } => return Err(JobError::Failed(message)),
                JobEvent::TimedOut { attempts } => return Err(JobError::Timeout { attempts }),
            }
        }
        Err(JobError::Cancelled)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub struct JobPoller;

impl JobPoller {
    /// Spawn the watcher for one job.
    ///
    /// At most one interval timer and one pending probe exist per
    /// handle; the handle owns cancellation.
    pub fn spawn(travel: TravelApi, job_id: impl Into<String>, policy: PollPolicy) -> PollHandle {
        let (tx, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();
        let job_id = job_id.into();

        tokio::spawn(async move {
            run_poll_loop(travel, job_id, policy, tx, worker_cancel).await;
        });

        PollHandle { events, cancel }
    }
}

/// Submit a preference form and, when the backend launched a remote
/// recommendation job, start watching it. A submission failure carries
/// the server's message verbatim; a submission without a job id is
/// accepted with nothing to watch.
pub async fn submit_and_watch(
    travel: &TravelApi,
    form: &TravelForm,
    policy: PollPolicy,
) -> Result<(SubmitFormResponse, Option<PollHandle>), TravelError> {
    let response = travel.submit_form(form).await?;
    let watcher = response
        .external_job_id
        .clone()
        .map(|job_id| JobPoller::spawn(travel.clone(), job_id, policy));
    Ok((response, watcher))
}

/// Emit one event unless cancellation already happened. Returns false
/// when the event must not (cancelled) or cannot (receiver gone) be
/// delivered, which stops the worker.
fn emit(
    tx: &mpsc::UnboundedSender<JobEvent>,
    cancel: &CancellationToken,
    event: JobEvent,
) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    tx.send(event).is_ok()
}

async fn run_poll_loop(
    travel: TravelApi,
    job_id: String,
    policy: PollPolicy,
    tx: mpsc::UnboundedSender<JobEvent>,
    cancel: CancellationToken,
) {
    let mut attempts: u32 = 0;
    let mut progress: u8 = 0;
    let mut network_failures: u32 = 0;

    // Single early out-of-band probe for fast first feedback. Does not
    // count against the attempt bound.
    tokio::select! {
        _ = time::sleep(policy.probe_delay) => {}
        _ = cancel.cancelled() => return,
    }
    let probe = tokio::select! {
        res = travel.job_status(&job_id) => res,
        _ = cancel.cancelled() => return,
    };
    match probe {
        Ok(body) => {
            let status = JobStatus::from_response(&body);
            debug!(job_id = %job_id, %status, "early probe");
            if status.is_terminal() {
                finish(&travel, &job_id, status, &tx, &cancel).await;
                return;
            }
            progress = PROBE_PROGRESS;
            if !emit(
                &tx,
                &cancel,
                JobEvent::Status {
                    status,
                    attempt: attempts,
                    progress,
                },
            ) {
                return;
            }
        }
        Err(e) => {
            if !poll_failure_is_transient(&e, &mut network_failures, &policy) {
                emit(
                    &tx,
                    &cancel,
                    JobEvent::Failed {
                        message: format!("Status check failed: {e}"),
                    },
                );
                return;
            }
            warn!(job_id = %job_id, "early probe failed, continuing on schedule: {e}");
        }
    }

    // Fixed-rate timer. A slow poll delays the next tick instead of
    // bursting to catch up, so one job never has overlapping polls.
    let mut ticker = time::interval_at(time::Instant::now() + policy.interval, policy.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = cancel.cancelled() => return,
        }
        attempts += 1;

        let outcome = tokio::select! {
            res = travel.job_status(&job_id) => res,
            _ = cancel.cancelled() => return,
        };

        match outcome {
            Ok(body) => {
                network_failures = 0;
                let status = JobStatus::from_response(&body);
                debug!(job_id = %job_id, %status, attempts, "poll");
                if status.is_terminal() {
                    finish(&travel, &job_id, status, &tx, &cancel).await;
                    return;
                }
                progress = advance_progress(progress, status);
                if !emit(
                    &tx,
                    &cancel,
                    JobEvent::Status {
                        status,
                        attempt: attempts,
                        progress,
                    },
                ) {
                    return;
                }
            }
            Err(e) => {
                if !poll_failure_is_transient(&e, &mut network_failures, &policy) {
                    emit(
                        &tx,
                        &cancel,
                        JobEvent::Failed {
                            message: format!("Status check failed: {e}"),
                        },
                    );
                    return;
                }
                warn!(job_id = %job_id, "status check failed, retrying on schedule: {e}");
            }
        }

        if attempts >= policy.max_attempts {
            emit(&tx, &cancel, JobEvent::TimedOut { attempts });
            return;
        }
    }
}

/// Handle a terminal status: fetch the result exactly once on success,
/// or surface the failure. Never re-enters the poll loop.
async fn finish(
    travel: &TravelApi,
    job_id: &str,
    status: JobStatus,
    tx: &mpsc::UnboundedSender<JobEvent>,
    cancel: &CancellationToken,
) {
    match status {
        JobStatus::Completed => {
            let fetched = tokio::select! {
                res = travel.job_result(job_id) => res,
                _ = cancel.cancelled() => return,
            };
            match fetched {
                Ok(result) => {
                    debug!(job_id = %job_id, "job completed, result fetched");
                    emit(tx, cancel, JobEvent::Done { result });
                }
                Err(e) => {
                    emit(
                        tx,
                        cancel,
                        JobEvent::Failed {
                            message: format!("Result fetch failed: {e}"),
                        },
                    );
                }
            }
        }
        JobStatus::Failed => {
            emit(
                tx,
                cancel,
                JobEvent::Failed {
                    message: "The search process failed. Please try again later.".to_string(),
                },
            );
        }
        // Callers only pass terminal statuses.
        JobStatus::Pending | JobStatus::Processing => {}
    }
}

/// Whether a failed status check may be silently retried on schedule.
/// Only network-level failures qualify, and only while the consecutive
/// budget from the policy lasts.
fn poll_failure_is_transient(
    error: &ApiError,
    network_failures: &mut u32,
    policy: &PollPolicy,
) -> bool {
    if !matches!(error, ApiError::Network(_)) {
        return false;
    }
    *network_failures += 1;
    *network_failures <= policy.network_retries
}

/// Advance the synthetic progress estimate: +5 toward 90 while the
/// server reports active processing, +2 toward 85 for anything else
/// non-terminal. Monotonic, and always below 100 until terminal.
fn advance_progress(current: u8, status: JobStatus) -> u8 {
    match status {
        JobStatus::Processing => (current + 5).min(90).max(current),
        _ => (current + 2).min(85).max(current),
    }
}

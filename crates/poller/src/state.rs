//! The polling state machine.
//!
//! All bookkeeping -- attempts, consecutive transport errors, optimistic
//! pending counts, last seen progress -- lives inside [`PollerState`], and
//! [`step`] is a pure transition function. Terminal-ness is structural:
//! every transition first checks whether the current state is terminal,
//! so a stale in-flight response can never resurrect a finished poll.

use std::time::Duration;

use sportsync_core::batch::{JobState, JobStatusView};
use sportsync_core::types::DbId;

/// Tunable parameters for one polling loop.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Fixed delay between status polls.
    pub interval: Duration,
    /// Hard cap on polls before the controller gives up. Together with
    /// `interval` this bounds the total wait (default: 100 x 3 s = 5 min).
    pub max_attempts: u32,
    /// Consecutive transport errors tolerated before giving up.
    pub max_transport_errors: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 100,
            max_transport_errors: 5,
        }
    }
}

/// Why a poll settled in `Failed`.
///
/// A controller-side timeout or transport breakdown is distinct from the
/// job itself reporting failure: the server-side batch may still finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    /// The start request itself failed; no job was created.
    StartFailed { error: String },
    /// The job reported a terminal failure.
    JobFailed { error: Option<String> },
    /// The attempt cap elapsed before the job finished.
    TimedOut { attempts: u32 },
    /// Too many consecutive transport errors.
    TransportErrors { count: u32 },
}

impl std::fmt::Display for PollFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartFailed { error } => write!(f, "start request failed: {error}"),
            Self::JobFailed { error: Some(error) } => write!(f, "job failed: {error}"),
            Self::JobFailed { error: None } => write!(f, "job failed"),
            Self::TimedOut { attempts } => write!(f, "gave up after {attempts} polls"),
            Self::TransportErrors { count } => {
                write!(f, "gave up after {count} consecutive transport errors")
            }
        }
    }
}

/// The controller's state: `Idle -> Starting -> Processing ->
/// {Completed | Failed}`, with `Reset` returning to `Idle` from anywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum PollerState {
    Idle,
    /// The start request is in flight; local state is seeded
    /// optimistically with every input item pending.
    Starting { pending: u32 },
    Processing {
        job_id: DbId,
        /// Polls issued so far (successful or errored).
        attempts: u32,
        /// Consecutive transport errors; reset by any successful poll.
        transport_errors: u32,
        /// Items the caller submitted, still assumed pending.
        pending: u32,
        /// Last progress percentage reported by the job, if any.
        progress: Option<u8>,
    },
    Completed {
        job_id: DbId,
        result: Option<serde_json::Value>,
    },
    Failed {
        /// Absent when the start request itself failed.
        job_id: Option<DbId>,
        failure: PollFailure,
    },
}

impl PollerState {
    /// Terminal states absorb every event except `Reset`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }

    /// The job this poll is tracking, once known.
    pub fn job_id(&self) -> Option<DbId> {
        match self {
            Self::Processing { job_id, .. } | Self::Completed { job_id, .. } => Some(*job_id),
            Self::Failed { job_id, .. } => *job_id,
            Self::Idle | Self::Starting { .. } => None,
        }
    }
}

/// An input to the state machine.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// Caller requested a new job with this many input items.
    Start { pending: u32 },
    /// The start request returned a job id.
    StartOk { job_id: DbId },
    /// The start request failed.
    StartErr { error: String },
    /// A status poll returned.
    Status(JobStatusView),
    /// A status poll failed at the transport level.
    TransportError,
    /// Explicit reset; cancels the poll from any state.
    Reset,
}

/// Apply one event. Pure: the caller owns timers and I/O.
pub fn step(state: &PollerState, event: PollEvent, config: &PollerConfig) -> PollerState {
    if matches!(&event, PollEvent::Reset) {
        return PollerState::Idle;
    }

    // Structural stale-response guard: a finished poll stays finished no
    // matter what a late response says.
    if state.is_terminal() {
        return state.clone();
    }

    match (state, event) {
        (PollerState::Idle, PollEvent::Start { pending }) => PollerState::Starting { pending },

        (PollerState::Starting { pending }, PollEvent::StartOk { job_id }) => {
            PollerState::Processing {
                job_id,
                attempts: 0,
                transport_errors: 0,
                pending: *pending,
                progress: None,
            }
        }

        (PollerState::Starting { .. }, PollEvent::StartErr { error }) => PollerState::Failed {
            job_id: None,
            failure: PollFailure::StartFailed { error },
        },

        (
            PollerState::Processing {
                job_id,
                attempts,
                pending,
                progress,
                ..
            },
            PollEvent::Status(view),
        ) => {
            // A response for some other job is noise.
            if view.job_id != *job_id {
                return state.clone();
            }

            match view.state {
                JobState::Completed => PollerState::Completed {
                    job_id: *job_id,
                    result: view.result,
                },
                JobState::Failed => PollerState::Failed {
                    job_id: Some(*job_id),
                    failure: PollFailure::JobFailed { error: view.error },
                },
                JobState::Waiting | JobState::Active => {
                    let attempts = attempts + 1;
                    if attempts >= config.max_attempts {
                        return PollerState::Failed {
                            job_id: Some(*job_id),
                            failure: PollFailure::TimedOut { attempts },
                        };
                    }
                    PollerState::Processing {
                        job_id: *job_id,
                        attempts,
                        transport_errors: 0,
                        pending: *pending,
                        progress: view.progress.or(*progress),
                    }
                }
            }
        }

        (
            PollerState::Processing {
                job_id,
                attempts,
                transport_errors,
                pending,
                progress,
            },
            PollEvent::TransportError,
        ) => {
            let transport_errors = transport_errors + 1;
            if transport_errors >= config.max_transport_errors {
                return PollerState::Failed {
                    job_id: Some(*job_id),
                    failure: PollFailure::TransportErrors {
                        count: transport_errors,
                    },
                };
            }
            let attempts = attempts + 1;
            if attempts >= config.max_attempts {
                return PollerState::Failed {
                    job_id: Some(*job_id),
                    failure: PollFailure::TimedOut { attempts },
                };
            }
            PollerState::Processing {
                job_id: *job_id,
                attempts,
                transport_errors,
                pending: *pending,
                progress: *progress,
            }
        }

        // Everything else is a no-op (e.g. a Start while already running).
        (state, _) => state.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

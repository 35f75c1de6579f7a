//! The polling driver and its HTTP client.
//!
//! [`PollController::run`] owns the timer: at most one status request is
//! in flight at a time (the next tick cannot fire until the previous
//! response was applied), and the timer is dropped on every terminal
//! transition, reset, and cancellation.

use async_trait::async_trait;
use serde::Deserialize;
use sportsync_core::batch::JobStatusView;
use sportsync_core::types::DbId;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::state::{step, PollEvent, PollerConfig, PollerState};

/// Errors from the status transport. Recoverable up to the controller's
/// consecutive-error cap.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    #[error("response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// The two calls the controller makes: start a job, poll its status.
#[async_trait]
pub trait JobClient: Send + Sync {
    async fn start(&self) -> Result<DbId, SourceError>;

    async fn status(&self, job_id: DbId) -> Result<JobStatusView, SourceError>;
}

/// Drives one job from start to a terminal state.
pub struct PollController<C> {
    client: C,
    config: PollerConfig,
}

impl<C: JobClient> PollController<C> {
    pub fn new(client: C, config: PollerConfig) -> Self {
        Self { client, config }
    }

    /// Start a job and poll until terminal, reset, or cancellation.
    ///
    /// `pending` seeds the optimistic local view with the number of
    /// submitted items. Cancellation acts as an explicit reset: the
    /// timer is released and `Idle` is returned; the server-side job
    /// keeps running.
    pub async fn run(&self, pending: u32, cancel: &CancellationToken) -> PollerState {
        let mut state = step(&PollerState::Idle, PollEvent::Start { pending }, &self.config);

        let event = match self.client.start().await {
            Ok(job_id) => PollEvent::StartOk { job_id },
            Err(e) => PollEvent::StartErr {
                error: e.to_string(),
            },
        };
        state = step(&state, event, &self.config);
        if state.is_terminal() {
            return state;
        }

        self.poll_loop(state, cancel).await
    }

    /// Poll an already-started job until terminal.
    pub async fn track(&self, job_id: DbId, cancel: &CancellationToken) -> PollerState {
        let state = step(&PollerState::Idle, PollEvent::Start { pending: 0 }, &self.config);
        let state = step(&state, PollEvent::StartOk { job_id }, &self.config);
        self.poll_loop(state, cancel).await
    }

    async fn poll_loop(&self, mut state: PollerState, cancel: &CancellationToken) -> PollerState {
        // First tick fires immediately, then on the fixed interval. A slow
        // response delays the next tick instead of stacking requests.
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Poll cancelled");
                    return step(&state, PollEvent::Reset, &self.config);
                }
                _ = interval.tick() => {
                    let Some(job_id) = state.job_id() else {
                        return state;
                    };

                    let event = match self.client.status(job_id).await {
                        Ok(view) => PollEvent::Status(view),
                        Err(e) => {
                            tracing::warn!(job_id, error = %e, "Status poll failed");
                            PollEvent::TransportError
                        }
                    };

                    state = step(&state, event, &self.config);
                    if state.is_terminal() {
                        return state;
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartedJob {
    job_id: DbId,
}

/// [`JobClient`] over the sync HTTP API.
pub struct HttpJobClient {
    http: reqwest::Client,
    base_url: String,
    /// Body for `POST /sync/seed-season`, stored so `start` can be
    /// retried by a fresh controller with identical parameters.
    seed_request: serde_json::Value,
}

impl HttpJobClient {
    pub fn new(base_url: impl Into<String>, seed_request: serde_json::Value) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            seed_request,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl JobClient for HttpJobClient {
    async fn start(&self) -> Result<DbId, SourceError> {
        let response = self
            .http
            .post(self.url("api/v1/sync/seed-season"))
            .json(&self.seed_request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::UnexpectedStatus(response.status().as_u16()));
        }

        let started: Envelope<StartedJob> = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        Ok(started.data.job_id)
    }

    async fn status(&self, job_id: DbId) -> Result<JobStatusView, SourceError> {
        let response = self
            .http
            .get(self.url(&format!("api/v1/sync/jobs/{job_id}/status")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::UnexpectedStatus(response.status().as_u16()));
        }

        let view: Envelope<JobStatusView> = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        Ok(view.data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use sportsync_core::batch::JobState;

    use super::*;
    use crate::state::PollFailure;

    const JOB_ID: DbId = 7;

    /// Scripted client: pops one response per poll; when the script is
    /// exhausted it keeps reporting the job as active.
    struct ScriptClient {
        responses: Mutex<VecDeque<Result<JobStatusView, SourceError>>>,
        status_calls: AtomicU32,
        fail_start: bool,
    }

    impl ScriptClient {
        fn new(responses: Vec<Result<JobStatusView, SourceError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                status_calls: AtomicU32::new(0),
                fail_start: false,
            }
        }

        fn calls(&self) -> u32 {
            self.status_calls.load(Ordering::SeqCst)
        }
    }

    fn active() -> Result<JobStatusView, SourceError> {
        Ok(JobStatusView {
            job_id: JOB_ID,
            state: JobState::Active,
            progress: Some(50),
            result: None,
            error: None,
        })
    }

    fn completed() -> Result<JobStatusView, SourceError> {
        Ok(JobStatusView {
            job_id: JOB_ID,
            state: JobState::Completed,
            progress: Some(100),
            result: Some(serde_json::json!({"kind": "seed_season", "version": 1})),
            error: None,
        })
    }

    fn transport_error() -> Result<JobStatusView, SourceError> {
        Err(SourceError::Transport("connection refused".into()))
    }

    #[async_trait]
    impl JobClient for ScriptClient {
        async fn start(&self) -> Result<DbId, SourceError> {
            if self.fail_start {
                return Err(SourceError::UnexpectedStatus(500));
            }
            Ok(JOB_ID)
        }

        async fn status(&self, _job_id: DbId) -> Result<JobStatusView, SourceError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(active)
        }
    }

    fn config(max_attempts: u32, max_transport_errors: u32) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(3),
            max_attempts,
            max_transport_errors,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completes_when_the_job_succeeds() {
        let client = ScriptClient::new(vec![active(), active(), completed()]);
        let controller = PollController::new(client, config(10, 3));

        let state = controller.run(5, &CancellationToken::new()).await;

        assert_matches!(&state, PollerState::Completed { job_id, result: Some(result) } => {
            assert_eq!(*job_id, JOB_ID);
            assert_eq!(result["kind"], "seed_season");
        });
        assert_eq!(controller.client.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn never_finishing_job_times_out_and_polling_stops() {
        let client = ScriptClient::new(Vec::new());
        let controller = PollController::new(client, config(5, 3));

        let state = controller.run(1, &CancellationToken::new()).await;

        assert_eq!(
            state,
            PollerState::Failed {
                job_id: Some(JOB_ID),
                failure: PollFailure::TimedOut { attempts: 5 },
            }
        );
        // No further polls after the terminal transition.
        assert_eq!(controller.client.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_streak_escalates() {
        let client = ScriptClient::new(vec![
            transport_error(),
            transport_error(),
            transport_error(),
        ]);
        let controller = PollController::new(client, config(10, 3));

        let state = controller.run(1, &CancellationToken::new()).await;

        assert_eq!(
            state,
            PollerState::Failed {
                job_id: Some(JOB_ID),
                failure: PollFailure::TransportErrors { count: 3 },
            }
        );
        assert_eq!(controller.client.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn intermittent_transport_errors_are_tolerated() {
        let client = ScriptClient::new(vec![
            transport_error(),
            transport_error(),
            active(),
            transport_error(),
            transport_error(),
            completed(),
        ]);
        let controller = PollController::new(client, config(20, 3));

        let state = controller.run(1, &CancellationToken::new()).await;

        assert_matches!(state, PollerState::Completed { .. });
    }

    #[tokio::test(start_paused = true)]
    async fn job_reported_failure_carries_the_error() {
        let failed = Ok(JobStatusView {
            job_id: JOB_ID,
            state: JobState::Failed,
            progress: None,
            result: None,
            error: Some("provider returned HTTP 503".into()),
        });
        let client = ScriptClient::new(vec![active(), failed]);
        let controller = PollController::new(client, config(10, 3));

        let state = controller.run(1, &CancellationToken::new()).await;

        assert_matches!(
            state,
            PollerState::Failed {
                job_id: Some(JOB_ID),
                failure: PollFailure::JobFailed { error: Some(_) },
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_start_never_polls() {
        let mut client = ScriptClient::new(Vec::new());
        client.fail_start = true;
        let controller = PollController::new(client, config(10, 3));

        let state = controller.run(1, &CancellationToken::new()).await;

        assert_matches!(
            state,
            PollerState::Failed { job_id: None, failure: PollFailure::StartFailed { .. } }
        );
        assert_eq!(controller.client.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_resets_and_stops_the_timer() {
        let client = ScriptClient::new(Vec::new());
        let controller = PollController::new(client, config(1000, 3));
        let cancel = CancellationToken::new();

        let handle = {
            let cancel = cancel.clone();
            async move {
                // Let a few polls happen, then tear the consumer down.
                tokio::time::sleep(Duration::from_secs(10)).await;
                cancel.cancel();
            }
        };

        let (state, ()) = tokio::join!(controller.run(1, &cancel), handle);

        assert_eq!(state, PollerState::Idle);
        let polled = controller.client.calls();
        assert!(polled >= 1, "expected at least one poll before cancel");

        // The timer is gone: waiting much longer produces no new polls.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(controller.client.calls(), polled);
    }

    #[tokio::test(start_paused = true)]
    async fn track_polls_an_existing_job() {
        let client = ScriptClient::new(vec![completed()]);
        let controller = PollController::new(client, config(10, 3));

        let state = controller.track(JOB_ID, &CancellationToken::new()).await;

        assert_matches!(state, PollerState::Completed { job_id: JOB_ID, .. });
        assert_eq!(controller.client.calls(), 1);
    }
}

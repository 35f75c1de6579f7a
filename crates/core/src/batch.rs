//! Shared batch/job vocabulary: item actions, triggers, the caller-facing
//! job state, the versioned batch result schema stored in `meta`, and the
//! polling status view.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Item actions
// ---------------------------------------------------------------------------

/// The outcome of processing one entity within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemAction {
    Inserted,
    Updated,
    Skipped,
    Failed,
}

impl ItemAction {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ItemAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

/// What started a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Manual,
    Scheduled,
    Api,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
            Self::Api => "api",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Caller-facing job state
// ---------------------------------------------------------------------------

/// The reduced state vocabulary exposed to polling clients.
///
/// Mapping from the stored batch status: queued -> waiting,
/// running -> active, success | skipped -> completed, failed -> failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Waiting,
    Active,
    Completed,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Terminal states never transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The status projection returned by `GET /sync/jobs/{jobId}/status`.
///
/// `result` is the batch's stored meta passed through verbatim and is only
/// present once the job completed. `progress` is omitted for empty batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusView {
    pub job_id: DbId,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `round((success + fail) / total * 100)` when `total > 0`, else `None`.
pub fn progress_percent(success: i32, fail: i32, total: i32) -> Option<u8> {
    if total <= 0 {
        return None;
    }
    let done = (success + fail) as f64;
    Some((done / total as f64 * 100.0).round().min(100.0) as u8)
}

// ---------------------------------------------------------------------------
// Batch result schema
// ---------------------------------------------------------------------------

/// Schema version written into every [`BatchResult`].
pub const BATCH_RESULT_VERSION: u32 = 1;

/// Per-step counters within a batch result.
///
/// A step succeeded when nothing fatal happened before its items ran and
/// at least one item succeeded -- or the step was legitimately empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub ok: u32,
    pub fail: u32,
    pub total: u32,
    /// Set when the step's provider fetch failed before any item ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && (self.ok > 0 || self.total == 0)
    }
}

/// The closed, kind-tagged result schema stored in a batch's `meta` column.
///
/// Consumers deserialize by tag; unknown/legacy shapes are passed through
/// to polling clients verbatim rather than migrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchResult {
    /// Composite season seeding: season row plus optional teams/fixtures.
    SeedSeason {
        version: u32,
        season: StepResult,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        teams: Option<StepResult>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fixtures: Option<StepResult>,
    },
    /// A single-entity synchronization batch.
    EntitySync { version: u32, entity: String, outcome: StepResult },
}

impl BatchResult {
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("batch result serializes")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_strings() {
        assert_eq!(ItemAction::Inserted.as_str(), "inserted");
        assert_eq!(ItemAction::Failed.to_string(), "failed");
    }

    #[test]
    fn progress_rounds() {
        assert_eq!(progress_percent(1, 0, 3), Some(33));
        assert_eq!(progress_percent(2, 0, 3), Some(67));
        assert_eq!(progress_percent(2, 1, 3), Some(100));
    }

    #[test]
    fn progress_omitted_for_empty_batch() {
        assert_eq!(progress_percent(0, 0, 0), None);
    }

    #[test]
    fn progress_never_exceeds_hundred() {
        // Counters can momentarily exceed total under racy reads.
        assert_eq!(progress_percent(5, 1, 5), Some(100));
    }

    #[test]
    fn step_success_rules() {
        let ran = StepResult { ok: 2, fail: 1, total: 3, error: None };
        assert!(ran.succeeded());

        let all_failed = StepResult { ok: 0, fail: 2, total: 2, error: None };
        assert!(!all_failed.succeeded());

        // Empty step is a success, not a failure.
        let empty = StepResult::default();
        assert!(empty.succeeded());

        let fetch_failed = StepResult {
            error: Some("provider unreachable".into()),
            ..Default::default()
        };
        assert!(!fetch_failed.succeeded());
    }

    #[test]
    fn batch_result_roundtrip_is_kind_tagged() {
        let result = BatchResult::SeedSeason {
            version: BATCH_RESULT_VERSION,
            season: StepResult { ok: 1, fail: 0, total: 1, error: None },
            teams: Some(StepResult { ok: 18, fail: 2, total: 20, error: None }),
            fixtures: None,
        };

        let value = result.to_value();
        assert_eq!(value["kind"], "seed_season");
        assert_eq!(value["version"], 1);

        let parsed: BatchResult = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn status_view_omits_absent_fields() {
        let view = JobStatusView {
            job_id: 7,
            state: JobState::Active,
            progress: Some(40),
            result: None,
            error: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["jobId"], 7);
        assert_eq!(json["state"], "active");
        assert_eq!(json["progress"], 40);
        assert!(json.get("result").is_none());
        assert!(json.get("error").is_none());
    }
}

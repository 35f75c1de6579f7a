//! Snapshot reconciliation engine.
//!
//! [`reconcile`] joins a store-side snapshot and a provider-side snapshot of
//! the same entity type on their external ids and classifies every entity
//! into a [`DiffStatus`]. It is a pure function: no store or network access,
//! O(n) over the combined snapshot size, deterministic output order.
//!
//! The unified view is transient -- it is recomputed on every inspection
//! request and never persisted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::normalize;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// The classification of one entity in a unified snapshot view.
///
/// - `Ok`          -- present on both sides, comparable fields agree.
/// - `Mismatch`    -- present on both sides, at least one field differs.
/// - `MissingInDb` -- present only in the provider snapshot.
/// - `ExtraInDb`   -- present only in the store snapshot.
/// - `New`         -- provider-only entity whose timestamp is still in the
///   future (e.g. an unplayed fixture), so the store is not expected to
///   have it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffStatus {
    Ok,
    Mismatch,
    MissingInDb,
    ExtraInDb,
    New,
}

impl DiffStatus {
    /// String representation for display, logging, and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Mismatch => "mismatch",
            Self::MissingInDb => "missing-in-db",
            Self::ExtraInDb => "extra-in-db",
            Self::New => "new",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side(s) of the join an entity was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffSource {
    Db,
    Provider,
    Both,
}

/// An entity that can take part in reconciliation.
///
/// Both store rows and provider DTOs implement this. `comparable_fields`
/// returns (field name, raw value) pairs; only fields present on *both*
/// sides under the same name are compared, after normalization.
pub trait Reconcilable {
    /// The provider-assigned stable identifier. Never changes once assigned.
    fn external_id(&self) -> String;

    /// Raw comparable field values, keyed by a side-independent field name.
    fn comparable_fields(&self) -> Vec<(&'static str, String)>;

    /// Timestamp used for ordering and the `new` classification
    /// (e.g. a fixture's kickoff). `None` sorts last under newest-first.
    fn as_of(&self) -> Option<Timestamp> {
        None
    }
}

/// A transient, read-only join of one store-side and one provider-side
/// record (or either alone) under a single diff status.
///
/// Invariant: at least one of `db` / `provider` is present.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedEntity<D, P> {
    pub external_id: String,
    pub source: DiffSource,
    pub status: DiffStatus,
    pub db: Option<D>,
    pub provider: Option<P>,
}

/// Per-status counts plus side totals for one unified view.
///
/// Consistency invariant: the five status counts sum to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub ok: usize,
    pub mismatch: usize,
    pub missing_in_db: usize,
    pub extra_in_db: usize,
    pub new: usize,
    pub db_total: usize,
    pub provider_total: usize,
    pub total: usize,
}

/// Output ordering for the unified view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcileOrder {
    /// Most recent first by the entities' `as_of` timestamp; entities
    /// without one sort last. Ties break on external id.
    #[default]
    NewestFirst,
    /// Lexicographic by external id.
    ExternalId,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Join two snapshots on external id and classify every entity.
///
/// Duplicate external ids within one snapshot are not expected; when they
/// occur the last one wins. `now` is the reference time for the `new`
/// classification of provider-only entities.
pub fn reconcile<D, P>(
    db: Vec<D>,
    provider: Vec<P>,
    order: ReconcileOrder,
    now: Timestamp,
) -> Vec<UnifiedEntity<D, P>>
where
    D: Reconcilable,
    P: Reconcilable,
{
    // Keys are string-normalized external ids; insertion order is kept so
    // the union enumerates deterministically before sorting.
    let mut keys: Vec<String> = Vec::with_capacity(db.len() + provider.len());
    let mut db_map: HashMap<String, D> = HashMap::with_capacity(db.len());
    let mut provider_map: HashMap<String, P> = HashMap::with_capacity(provider.len());

    for entity in db {
        let key = entity.external_id().trim().to_string();
        if db_map.insert(key.clone(), entity).is_none() {
            keys.push(key);
        }
    }
    for entity in provider {
        let key = entity.external_id().trim().to_string();
        if provider_map.insert(key.clone(), entity).is_none() && !db_map.contains_key(&key) {
            keys.push(key);
        }
    }

    let mut unified: Vec<UnifiedEntity<D, P>> = keys
        .into_iter()
        .map(|key| {
            let db_side = db_map.remove(&key);
            let provider_side = provider_map.remove(&key);
            classify(key, db_side, provider_side, now)
        })
        .collect();

    sort_unified(&mut unified, order);
    unified
}

/// Derive summary counts from a unified view in a single pass.
pub fn summarize<D, P>(unified: &[UnifiedEntity<D, P>]) -> DiffSummary {
    let mut summary = DiffSummary {
        total: unified.len(),
        ..Default::default()
    };

    for entity in unified {
        match entity.status {
            DiffStatus::Ok => summary.ok += 1,
            DiffStatus::Mismatch => summary.mismatch += 1,
            DiffStatus::MissingInDb => summary.missing_in_db += 1,
            DiffStatus::ExtraInDb => summary.extra_in_db += 1,
            DiffStatus::New => summary.new += 1,
        }
        if entity.db.is_some() {
            summary.db_total += 1;
        }
        if entity.provider.is_some() {
            summary.provider_total += 1;
        }
    }

    summary
}

fn classify<D, P>(
    external_id: String,
    db: Option<D>,
    provider: Option<P>,
    now: Timestamp,
) -> UnifiedEntity<D, P>
where
    D: Reconcilable,
    P: Reconcilable,
{
    let (source, status) = match (&db, &provider) {
        (Some(_), None) => (DiffSource::Db, DiffStatus::ExtraInDb),
        (None, Some(p)) => {
            let status = match p.as_of() {
                Some(ts) if ts > now => DiffStatus::New,
                _ => DiffStatus::MissingInDb,
            };
            (DiffSource::Provider, status)
        }
        (Some(d), Some(p)) => {
            let status = if fields_match(d, p) {
                DiffStatus::Ok
            } else {
                DiffStatus::Mismatch
            };
            (DiffSource::Both, status)
        }
        // Unreachable: every key came from one of the two maps.
        (None, None) => (DiffSource::Both, DiffStatus::Ok),
    };

    UnifiedEntity {
        external_id,
        source,
        status,
        db,
        provider,
    }
}

/// Compare the intersection of the two sides' comparable fields under
/// normalization. Fields present on only one side are ignored.
fn fields_match<D: Reconcilable, P: Reconcilable>(db: &D, provider: &P) -> bool {
    let db_fields: HashMap<&'static str, String> = db.comparable_fields().into_iter().collect();

    provider
        .comparable_fields()
        .into_iter()
        .all(|(name, provider_value)| match db_fields.get(name) {
            Some(db_value) => normalize::eq_comparable(db_value, &provider_value),
            None => true,
        })
}

fn sort_unified<D, P>(unified: &mut [UnifiedEntity<D, P>], order: ReconcileOrder)
where
    D: Reconcilable,
    P: Reconcilable,
{
    match order {
        ReconcileOrder::NewestFirst => {
            unified.sort_by(|a, b| {
                let ts_a = entry_timestamp(a);
                let ts_b = entry_timestamp(b);
                // Descending by timestamp, None last, external id tiebreak.
                match (ts_a, ts_b) {
                    (Some(x), Some(y)) => y.cmp(&x),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }
                .then_with(|| a.external_id.cmp(&b.external_id))
            });
        }
        ReconcileOrder::ExternalId => {
            unified.sort_by(|a, b| a.external_id.cmp(&b.external_id));
        }
    }
}

fn entry_timestamp<D, P>(entity: &UnifiedEntity<D, P>) -> Option<Timestamp>
where
    D: Reconcilable,
    P: Reconcilable,
{
    entity
        .provider
        .as_ref()
        .and_then(Reconcilable::as_of)
        .or_else(|| entity.db.as_ref().and_then(Reconcilable::as_of))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[derive(Debug, Clone, Serialize)]
    struct Rec {
        id: String,
        name: String,
        score: Option<String>,
        ts: Option<Timestamp>,
    }

    impl Rec {
        fn new(id: &str, name: &str) -> Self {
            Self {
                id: id.into(),
                name: name.into(),
                score: None,
                ts: None,
            }
        }

        fn with_score(mut self, score: &str) -> Self {
            self.score = Some(score.into());
            self
        }

        fn with_ts(mut self, ts: Timestamp) -> Self {
            self.ts = Some(ts);
            self
        }
    }

    impl Reconcilable for Rec {
        fn external_id(&self) -> String {
            self.id.clone()
        }

        fn comparable_fields(&self) -> Vec<(&'static str, String)> {
            let mut fields = vec![("name", self.name.clone())];
            if let Some(score) = &self.score {
                fields.push(("score", score.clone()));
            }
            fields
        }

        fn as_of(&self) -> Option<Timestamp> {
            self.ts
        }
    }

    fn run(db: Vec<Rec>, provider: Vec<Rec>) -> Vec<UnifiedEntity<Rec, Rec>> {
        reconcile(db, provider, ReconcileOrder::ExternalId, Utc::now())
    }

    #[test]
    fn spec_scenario_one_ok_one_missing() {
        let unified = run(
            vec![Rec::new("1", "A")],
            vec![Rec::new("1", "A"), Rec::new("2", "B")],
        );

        assert_eq!(unified.len(), 2);
        assert_eq!(unified[0].external_id, "1");
        assert_eq!(unified[0].status, DiffStatus::Ok);
        assert_eq!(unified[0].source, DiffSource::Both);
        assert_eq!(unified[1].external_id, "2");
        assert_eq!(unified[1].status, DiffStatus::MissingInDb);
        assert_eq!(unified[1].source, DiffSource::Provider);

        let summary = summarize(&unified);
        assert_eq!(summary.ok, 1);
        assert_eq!(summary.missing_in_db, 1);
        assert_eq!(summary.extra_in_db, 0);
        assert_eq!(summary.mismatch, 0);
        assert_eq!(summary.db_total, 1);
        assert_eq!(summary.provider_total, 2);
    }

    #[test]
    fn every_union_key_appears_exactly_once() {
        let unified = run(
            vec![Rec::new("1", "a"), Rec::new("2", "b"), Rec::new("3", "c")],
            vec![Rec::new("2", "b"), Rec::new("4", "d")],
        );

        let mut ids: Vec<&str> = unified.iter().map(|u| u.external_id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["1", "2", "3", "4"]);
    }

    #[test]
    fn status_counts_sum_to_total() {
        let unified = run(
            vec![Rec::new("1", "a"), Rec::new("2", "x"), Rec::new("3", "c")],
            vec![Rec::new("2", "y"), Rec::new("4", "d")],
        );
        let summary = summarize(&unified);

        assert_eq!(
            summary.ok + summary.mismatch + summary.missing_in_db + summary.extra_in_db
                + summary.new,
            summary.total
        );
        assert_eq!(summary.total, unified.len());
    }

    #[test]
    fn missing_and_extra_are_never_swapped() {
        let unified = run(vec![Rec::new("db-only", "a")], vec![Rec::new("prov-only", "b")]);

        for entity in &unified {
            match entity.external_id.as_str() {
                "db-only" => assert_eq!(entity.status, DiffStatus::ExtraInDb),
                "prov-only" => assert_eq!(entity.status, DiffStatus::MissingInDb),
                other => panic!("unexpected id {other}"),
            }
        }
    }

    #[test]
    fn whitespace_and_separator_differences_are_ok() {
        let unified = run(
            vec![Rec::new("1", " Arsenal  FC ").with_score("2:1")],
            vec![Rec::new("1", "arsenal fc").with_score("2-1")],
        );
        assert_eq!(unified[0].status, DiffStatus::Ok);
    }

    #[test]
    fn real_field_difference_is_mismatch() {
        let unified = run(
            vec![Rec::new("1", "Arsenal").with_score("2-1")],
            vec![Rec::new("1", "Arsenal").with_score("1-2")],
        );
        assert_eq!(unified[0].status, DiffStatus::Mismatch);
    }

    #[test]
    fn one_sided_fields_are_ignored() {
        // db has no score field; provider does. Intersection is name only.
        let unified = run(
            vec![Rec::new("1", "Arsenal")],
            vec![Rec::new("1", "Arsenal").with_score("2-0")],
        );
        assert_eq!(unified[0].status, DiffStatus::Ok);
    }

    #[test]
    fn future_provider_only_entity_is_new() {
        let now = Utc::now();
        let future = now + Duration::days(3);
        let past = now - Duration::days(3);

        let unified = reconcile(
            Vec::<Rec>::new(),
            vec![
                Rec::new("upcoming", "a").with_ts(future),
                Rec::new("played", "b").with_ts(past),
            ],
            ReconcileOrder::ExternalId,
            now,
        );

        assert_eq!(unified[0].external_id, "played");
        assert_eq!(unified[0].status, DiffStatus::MissingInDb);
        assert_eq!(unified[1].external_id, "upcoming");
        assert_eq!(unified[1].status, DiffStatus::New);
    }

    #[test]
    fn duplicate_keys_last_one_wins() {
        let unified = run(
            vec![Rec::new("1", "stale"), Rec::new("1", "fresh")],
            vec![Rec::new("1", "fresh")],
        );

        assert_eq!(unified.len(), 1);
        assert_eq!(unified[0].status, DiffStatus::Ok);
    }

    #[test]
    fn newest_first_ordering_with_none_last() {
        let now = Utc::now();
        let unified = reconcile(
            vec![
                Rec::new("old", "a").with_ts(now - Duration::days(2)),
                Rec::new("recent", "b").with_ts(now - Duration::hours(1)),
                Rec::new("undated", "c"),
            ],
            Vec::<Rec>::new(),
            ReconcileOrder::NewestFirst,
            now,
        );

        let ids: Vec<&str> = unified.iter().map(|u| u.external_id.as_str()).collect();
        assert_eq!(ids, ["recent", "old", "undated"]);
    }

    #[test]
    fn empty_snapshots_produce_empty_view() {
        let unified = run(Vec::new(), Vec::new());
        assert!(unified.is_empty());
        assert_eq!(summarize(&unified), DiffSummary::default());
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&DiffStatus::MissingInDb).unwrap();
        assert_eq!(json, "\"missing-in-db\"");
        let parsed: DiffStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, DiffStatus::MissingInDb);
    }
}

//! Merge a new run into the previous status record.

use chrono::{DateTime, Utc};

use crate::models::{RunOutcome, Snapshot, Status};

/// How a snapshot field changes during a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Drop the field.
    Clear,
    /// Copy the field from the previous record; absent if there is none.
    KeepPrevious,
    /// Overwrite the field.
    Set(T),
}

impl<T: Clone> FieldUpdate<T> {
    pub fn resolve(self, previous: Option<&T>) -> Option<T> {
        match self {
            Self::Clear => None,
            Self::KeepPrevious => previous.cloned(),
            Self::Set(value) => Some(value),
        }
    }
}

struct SnapshotUpdates {
    first_failure: FieldUpdate<Snapshot>,
    last_failure: FieldUpdate<Snapshot>,
    last_success: FieldUpdate<Snapshot>,
}

fn plan(previous: Option<&Status>, success: bool, current: Snapshot) -> SnapshotUpdates {
    if success {
        return SnapshotUpdates {
            first_failure: FieldUpdate::Clear,
            last_failure: FieldUpdate::Clear,
            last_success: FieldUpdate::Set(current),
        };
    }

    // Without a recorded streak start, the current run is the best guess.
    let streak_started = previous.is_some_and(|p| p.first_failure.is_some());
    SnapshotUpdates {
        first_failure: if streak_started {
            FieldUpdate::KeepPrevious
        } else {
            FieldUpdate::Set(current.clone())
        },
        last_failure: FieldUpdate::Set(current),
        last_success: FieldUpdate::KeepPrevious,
    }
}

/// Compute the next status after `run`.
///
/// Cancelled runs must be filtered out by the caller; anything that is not
/// a success is merged as a failure.
pub fn merge(previous: Option<&Status>, run: &RunOutcome, now: DateTime<Utc>) -> Status {
    let success = run.class().is_success();
    let updates = plan(previous, success, run.snapshot());

    Status {
        updated_at: now,
        failing: !success,
        source_repo: run.source_repo.clone(),
        last_run_id: run.run_id,
        build_sha_a: run.build_sha_a.clone(),
        build_sha_b: run.build_sha_b.clone(),
        first_failure: updates
            .first_failure
            .resolve(previous.and_then(|p| p.first_failure.as_ref())),
        last_failure: updates
            .last_failure
            .resolve(previous.and_then(|p| p.last_failure.as_ref())),
        last_success: updates
            .last_success
            .resolve(previous.and_then(|p| p.last_success.as_ref())),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn t(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn run(status: &str, id: u64, at: DateTime<Utc>) -> RunOutcome {
        RunOutcome {
            raw_status: status.to_string(),
            timestamp: at,
            source_repo: "acme/widgets".to_string(),
            run_id: id,
            build_sha_a: format!("a{id}"),
            build_sha_b: format!("b{id}"),
        }
    }

    #[test]
    fn field_update_resolution() {
        let prev = 3;
        assert_eq!(FieldUpdate::Clear.resolve(Some(&prev)), None);
        assert_eq!(FieldUpdate::KeepPrevious.resolve(Some(&prev)), Some(3));
        assert_eq!(FieldUpdate::<i32>::KeepPrevious.resolve(None), None);
        assert_eq!(FieldUpdate::Set(9).resolve(Some(&prev)), Some(9));
    }

    #[test]
    fn first_failure_without_history() {
        let status = merge(None, &run("failure", 42, t(1)), t(2));
        let snap = Snapshot::new(t(1), "a42", "b42");
        assert!(status.failing);
        assert_eq!(status.last_run_id, 42);
        assert_eq!(status.updated_at, t(2));
        assert_eq!(status.first_failure, Some(snap.clone()));
        assert_eq!(status.last_failure, Some(snap));
        assert_eq!(status.last_success, None);
    }

    #[test]
    fn streak_start_is_kept() {
        let first = merge(None, &run("failure", 1, t(0)), t(0));
        let second = merge(Some(&first), &run("failure", 2, t(2)), t(2));
        assert_eq!(second.first_failure, Some(Snapshot::new(t(0), "a1", "b1")));
        assert_eq!(second.last_failure, Some(Snapshot::new(t(2), "a2", "b2")));
    }

    #[test]
    fn failure_keeps_last_success() {
        let ok = merge(None, &run("success", 1, t(0)), t(0));
        let failed = merge(Some(&ok), &run("failure", 2, t(1)), t(1));
        assert_eq!(failed.last_success, Some(Snapshot::new(t(0), "a1", "b1")));
        assert_eq!(failed.first_failure, Some(Snapshot::new(t(1), "a2", "b2")));
    }

    #[test]
    fn failing_record_without_streak_start_restarts_streak() {
        let mut legacy = merge(None, &run("failure", 1, t(0)), t(0));
        legacy.first_failure = None;
        let next = merge(Some(&legacy), &run("failure", 2, t(3)), t(3));
        assert_eq!(next.first_failure, Some(Snapshot::new(t(3), "a2", "b2")));
    }

    #[test]
    fn success_resets_streak() {
        let mut status = merge(None, &run("failure", 1, t(0)), t(0));
        for id in 2..5 {
            status = merge(Some(&status), &run("failure", id, t(id as i64)), t(id as i64));
        }
        let fixed = merge(Some(&status), &run("Success", 9, t(9)), t(10));
        assert!(!fixed.failing);
        assert_eq!(fixed.first_failure, None);
        assert_eq!(fixed.last_failure, None);
        assert_eq!(fixed.last_success, Some(Snapshot::new(t(9), "a9", "b9")));
        assert_eq!(fixed.build_sha_a, "a9");
    }

    #[test]
    fn unknown_status_merges_as_failure() {
        let status = merge(None, &run("timed_out", 5, t(0)), t(0));
        assert!(status.failing);
        assert!(status.last_failure.is_some());
    }
}

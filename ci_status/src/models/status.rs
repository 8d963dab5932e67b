//! Status: the record persisted inside the tracking issue body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time record of one run's build identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub date: DateTime<Utc>,
    pub build_sha_a: String,
    pub build_sha_b: String,
}

impl Snapshot {
    pub fn new(
        date: DateTime<Utc>,
        build_sha_a: impl Into<String>,
        build_sha_b: impl Into<String>,
    ) -> Self {
        Self {
            date,
            build_sha_a: build_sha_a.into(),
            build_sha_b: build_sha_b.into(),
        }
    }
}

/// Build history for one tracking issue.
///
/// `first_failure` marks the start of the current failure streak and is
/// cleared by the next success. `last_failure` and `last_success` hold the
/// most recent run of each kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub updated_at: DateTime<Utc>,
    /// True iff the most recent run was not a success.
    #[serde(rename = "failure")]
    pub failing: bool,
    #[serde(rename = "repository")]
    pub source_repo: String,
    #[serde(rename = "runId")]
    pub last_run_id: u64,
    pub build_sha_a: String,
    pub build_sha_b: String,
    #[serde(default)]
    pub first_failure: Option<Snapshot>,
    #[serde(default)]
    pub last_failure: Option<Snapshot>,
    #[serde(default)]
    pub last_success: Option<Snapshot>,
}

impl Status {
    /// Start of the current failure streak, if the build is failing.
    pub fn failing_since(&self) -> Option<DateTime<Utc>> {
        if !self.failing {
            return None;
        }
        self.first_failure.as_ref().map(|s| s.date)
    }
}

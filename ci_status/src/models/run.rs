//! RunOutcome: what a single CI run reports.

use chrono::{DateTime, Utc};

use crate::classify::RunClass;
use crate::models::Snapshot;

/// Outcome of one CI run, as passed on the command line.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Raw job status string (`success`, `failure`, `cancelled`, ...).
    pub raw_status: String,
    pub timestamp: DateTime<Utc>,
    /// Repository the CI run belongs to, e.g. `owner/project`.
    pub source_repo: String,
    pub run_id: u64,
    pub build_sha_a: String,
    pub build_sha_b: String,
}

impl RunOutcome {
    pub fn class(&self) -> RunClass {
        RunClass::parse(&self.raw_status)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.timestamp, &self.build_sha_a, &self.build_sha_b)
    }
}

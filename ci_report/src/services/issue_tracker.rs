//! Issue tracker seam used by the report sequence.

use async_trait::async_trait;
use ci_status::IssueState;

#[derive(Debug, Clone)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    /// Issue body; an issue without a description has an empty body.
    pub body: String,
    pub state: IssueState,
}

#[derive(Debug, Clone)]
pub struct IssueComment {
    pub id: u64,
    pub html_url: String,
}

/// Operations the report needs from an issue tracker.
///
/// Errors are transport failures and are never retried.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch an issue, `None` if it does not exist.
    async fn find_issue(&self, repo: &str, number: u64) -> anyhow::Result<Option<Issue>>;

    async fn comment(&self, repo: &str, number: u64, body: &str)
        -> anyhow::Result<IssueComment>;

    async fn close(&self, repo: &str, number: u64) -> anyhow::Result<()>;

    async fn reopen(&self, repo: &str, number: u64) -> anyhow::Result<()>;

    /// Replace the issue body.
    async fn set_body(&self, repo: &str, number: u64, body: &str) -> anyhow::Result<()>;
}

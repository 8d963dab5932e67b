//! Report sequence: classify the run, update the issue, rewrite the status record.

use chrono::{DateTime, Utc};
use ci_status::{IssueAction, RunClass, RunOutcome, Status};

use crate::config::ReportConfig;
use crate::services::issue_tracker::{Issue, IssueTracker};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unable to find issue {number} in project {repo}")]
    IssueNotFound { repo: String, number: u64 },
}

/// What a report run did.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// The run was cancelled; nothing was touched.
    Cancelled,
    Updated {
        action: IssueAction,
        status: Status,
    },
}

/// Apply one CI run to its tracking issue.
pub async fn report(
    tracker: &dyn IssueTracker,
    config: &ReportConfig,
    run: &RunOutcome,
    now: DateTime<Utc>,
) -> anyhow::Result<ReportOutcome> {
    let class = run.class();
    if class == RunClass::Cancelled {
        tracing::info!("Job status is `cancelled` - exiting");
        return Ok(ReportOutcome::Cancelled);
    }
    tracing::info!("The CI build had status {}", run.raw_status);

    let repo = config.issue_repo.as_str();
    let number = config.issue_number;
    let issue = tracker
        .find_issue(repo, number)
        .await?
        .ok_or_else(|| ReportError::IssueNotFound {
            repo: repo.to_string(),
            number,
        })?;
    tracing::info!("Report issue found: {} - {}", issue.title, issue.html_url);
    tracing::info!("The issue is currently {}", issue.state);

    let action = ci_status::decide(class, issue.state);
    apply_action(tracker, config, &issue, action, run.run_id).await?;
    tracing::debug!(state = %action.next_state(issue.state), "Issue state after report");

    let status = update_status(tracker, config, &issue, run, now).await?;
    Ok(ReportOutcome::Updated { action, status })
}

async fn apply_action(
    tracker: &dyn IssueTracker,
    config: &ReportConfig,
    issue: &Issue,
    action: IssueAction,
    run_id: u64,
) -> anyhow::Result<()> {
    let repo = config.issue_repo.as_str();
    let run_url = config.run_url(run_id);

    match action {
        IssueAction::CloseWithComment => {
            let comment = tracker
                .comment(repo, issue.number, &run_comment("Build fixed", &run_url))
                .await?;
            tracker.close(repo, issue.number).await?;
            tracing::info!(
                comment_id = comment.id,
                "Comment added on issue {} - {}, the issue has also been closed",
                issue.html_url,
                comment.html_url
            );
        }
        IssueAction::Comment => {
            let comment = tracker
                .comment(
                    repo,
                    issue.number,
                    &run_comment("The build is still failing", &run_url),
                )
                .await?;
            tracing::info!(
                comment_id = comment.id,
                "Comment added on issue {} - {}",
                issue.html_url,
                comment.html_url
            );
        }
        IssueAction::ReopenWithComment => {
            tracker.reopen(repo, issue.number).await?;
            let comment = tracker
                .comment(
                    repo,
                    issue.number,
                    &run_comment("Unfortunately, the build failed", &run_url),
                )
                .await?;
            tracing::info!(
                comment_id = comment.id,
                "Comment added on issue {} - {}, the issue has been re-opened",
                issue.html_url,
                comment.html_url
            );
        }
        IssueAction::NoOp => {
            tracing::info!("Nothing to do - the build passed and the issue is already closed");
        }
    }
    Ok(())
}

async fn update_status(
    tracker: &dyn IssueTracker,
    config: &ReportConfig,
    issue: &Issue,
    run: &RunOutcome,
    now: DateTime<Utc>,
) -> anyhow::Result<Status> {
    let previous = ci_status::extract(&issue.body);
    if previous.is_none() {
        tracing::debug!(issue = issue.number, "No previous status record");
    }

    let status = ci_status::merge(previous.as_ref(), run, now);
    let block = ci_status::encode(&status)?;
    let body = ci_status::splice(&issue.body, &block);
    tracker
        .set_body(&config.issue_repo, issue.number, &body)
        .await?;

    tracing::info!(
        issue = issue.number,
        failing = status.failing,
        run_id = status.last_run_id,
        failing_since = ?status.failing_since(),
        "Status record updated"
    );
    Ok(status)
}

fn run_comment(headline: &str, run_url: &str) -> String {
    format!("{headline}:\n* Link to latest CI run: {run_url}")
}

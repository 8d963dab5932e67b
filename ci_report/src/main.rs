//! CI report: keeps a GitHub tracking issue in sync with a CI build.
//!
//! Invoked once per CI run. Opens, closes or comments on the tracking issue
//! depending on the run outcome, then rewrites the status record embedded
//! in the issue body.

mod config;
mod services;

use std::process::ExitCode;

use clap::Parser;
use ci_status::RunOutcome;

use crate::config::{ReportConfig, DEFAULT_API_URL, DEFAULT_SERVER_URL};
use crate::services::github_service::GithubClient;
use crate::services::report_service::{self, ReportError, ReportOutcome};

const EXIT_OK: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_ISSUE_NOT_FOUND: u8 = 2;

#[derive(Parser)]
#[command(
    name = "ci-report",
    about = "Updates a tracking issue depending on the status of the build"
)]
struct Cli {
    /// GitHub token to use when calling the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Status of the CI run (success, failure, cancelled, ...)
    #[arg(long)]
    status: String,

    /// Repository where the issue resides (owner/name)
    #[arg(long)]
    issue_repo: String,

    /// Issue to update
    #[arg(long)]
    issue_number: u64,

    /// Repository for which the CI status is reported (owner/name)
    #[arg(long)]
    this_repo: String,

    /// ID of the workflow run being reported
    #[arg(long)]
    run_id: u64,

    /// First build identifier of the run, e.g. the upstream commit
    #[arg(long, default_value = "")]
    build_sha_a: String,

    /// Second build identifier of the run, e.g. the project commit
    #[arg(long, default_value = "")]
    build_sha_b: String,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// GitHub web base URL, used for run links
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    ExitCode::from(exit_status(&run(cli).await))
}

/// Map the report result to the process exit status.
fn exit_status(result: &anyhow::Result<ReportOutcome>) -> u8 {
    match result {
        Ok(ReportOutcome::Cancelled) => EXIT_OK,
        Ok(ReportOutcome::Updated { action, status }) => {
            tracing::debug!(?action, failing = status.failing, "Report complete");
            EXIT_OK
        }
        Err(e) => {
            if let Some(not_found) = e.downcast_ref::<ReportError>() {
                tracing::error!("{}", not_found);
                return EXIT_ISSUE_NOT_FOUND;
            }
            tracing::error!("Report failed: {:#}", e);
            eprintln!("Error: {e:?}");
            EXIT_FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ReportOutcome> {
    let config = ReportConfig::new(
        &cli.token,
        &cli.api_url,
        &cli.server_url,
        &cli.issue_repo,
        cli.issue_number,
        &cli.this_repo,
    )?;

    let now = chrono::Utc::now();
    let run = RunOutcome {
        raw_status: cli.status,
        timestamp: now,
        source_repo: config.this_repo.clone(),
        run_id: cli.run_id,
        build_sha_a: cli.build_sha_a,
        build_sha_b: cli.build_sha_b,
    };

    let client = GithubClient::new(&config.api_url, &config.token)?;
    report_service::report(&client, &config, &run, now).await
}

fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ci_status::IssueAction;

    use super::*;

    fn outcome() -> RunOutcome {
        RunOutcome {
            raw_status: "failure".to_string(),
            timestamp: Utc::now(),
            source_repo: "acme/widgets".to_string(),
            run_id: 42,
            build_sha_a: "aaa".to_string(),
            build_sha_b: "bbb".to_string(),
        }
    }

    #[test]
    fn cancelled_and_updated_runs_exit_zero() {
        assert_eq!(exit_status(&Ok(ReportOutcome::Cancelled)), 0);
        let updated = ReportOutcome::Updated {
            action: IssueAction::Comment,
            status: ci_status::merge(None, &outcome(), Utc::now()),
        };
        assert_eq!(exit_status(&Ok(updated)), 0);
    }

    #[test]
    fn missing_issue_has_its_own_exit_status() {
        let err = anyhow::Error::from(ReportError::IssueNotFound {
            repo: "acme/tracker".to_string(),
            number: 12,
        });
        assert_eq!(exit_status(&Err(err)), EXIT_ISSUE_NOT_FOUND);
        assert_ne!(EXIT_ISSUE_NOT_FOUND, EXIT_FAILURE);
    }

    #[test]
    fn other_errors_exit_one() {
        let err = anyhow::anyhow!("github api update issue body failed with status 500");
        assert_eq!(exit_status(&Err(err)), 1);
    }
}

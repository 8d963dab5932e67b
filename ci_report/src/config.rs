//! Report configuration: where the tracking issue lives and how to reach it.

use anyhow::{bail, Context};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// GitHub token used for all API calls.
    pub token: String,
    /// REST API base URL.
    pub api_url: String,
    /// Web base URL, used for run links in comments.
    pub server_url: String,
    /// Repository holding the tracking issue (`owner/name`).
    pub issue_repo: String,
    pub issue_number: u64,
    /// Repository the CI run reports for (`owner/name`).
    pub this_repo: String,
}

impl ReportConfig {
    pub fn new(
        token: &str,
        api_url: &str,
        server_url: &str,
        issue_repo: &str,
        issue_number: u64,
        this_repo: &str,
    ) -> anyhow::Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            bail!("GitHub token is empty");
        }
        let issue_repo = validate_repo(issue_repo).context("invalid issue repository")?;
        let this_repo = validate_repo(this_repo).context("invalid reporting repository")?;

        Ok(Self {
            token: token.to_string(),
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            server_url: server_url.trim().trim_end_matches('/').to_string(),
            issue_repo,
            issue_number,
            this_repo,
        })
    }

    /// Link to a run of the reporting repository's workflow.
    pub fn run_url(&self, run_id: u64) -> String {
        format!("{}/{}/actions/runs/{}", self.server_url, self.this_repo, run_id)
    }
}

fn validate_repo(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    match trimmed.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(trimmed.to_string())
        }
        _ => bail!("expected `owner/name`, got `{raw}`"),
    }
}

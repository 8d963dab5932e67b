//! GitHub integration: issue lookup, comments, state changes, body updates.

use anyhow::{bail, Context};
use async_trait::async_trait;
use ci_status::IssueState;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::services::issue_tracker::{Issue, IssueComment, IssueTracker};

#[derive(Debug, Deserialize)]
struct GithubIssue {
    number: u64,
    title: String,
    html_url: String,
    #[serde(default)]
    body: Option<String>,
    state: String,
}

#[derive(Debug, Deserialize)]
struct GithubComment {
    id: u64,
    html_url: String,
}

impl From<GithubIssue> for Issue {
    fn from(raw: GithubIssue) -> Self {
        let state = if raw.state.eq_ignore_ascii_case("open") {
            IssueState::Open
        } else {
            IssueState::Closed
        };
        Issue {
            number: raw.number,
            title: raw.title,
            html_url: raw.html_url,
            body: raw.body.unwrap_or_default(),
            state,
        }
    }
}

/// GitHub REST client for a single token.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GithubClient {
    pub fn new(api_url: &str, token: &str) -> anyhow::Result<Self> {
        use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("ci-report"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .context("invalid github authorization header")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to create github api client")?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn issue_url(&self, repo: &str, number: u64) -> String {
        format!("{}/repos/{repo}/issues/{number}", self.api_url)
    }

    async fn patch_issue(
        &self,
        operation: &str,
        repo: &str,
        number: u64,
        payload: serde_json::Value,
    ) -> anyhow::Result<()> {
        let resp = self
            .http
            .patch(self.issue_url(repo, number))
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("github api {operation} request failed"))?;
        ensure_success(operation, resp).await?;
        Ok(())
    }
}

async fn ensure_success(
    operation: &str,
    resp: reqwest::Response,
) -> anyhow::Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    bail!(
        "github api {operation} failed with status {}: {}",
        status.as_u16(),
        truncate(&text, 800)
    );
}

async fn read_json<T: DeserializeOwned>(
    operation: &str,
    resp: reqwest::Response,
) -> anyhow::Result<T> {
    ensure_success(operation, resp)
        .await?
        .json::<T>()
        .await
        .with_context(|| format!("failed to decode github {operation} response"))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl IssueTracker for GithubClient {
    async fn find_issue(&self, repo: &str, number: u64) -> anyhow::Result<Option<Issue>> {
        let resp = self
            .http
            .get(self.issue_url(repo, number))
            .send()
            .await
            .context("github api get issue request failed")?;

        if resp.status() == StatusCode::NOT_FOUND || resp.status() == StatusCode::GONE {
            tracing::debug!(repo, issue = number, "GitHub reports no such issue");
            return Ok(None);
        }

        let issue: GithubIssue = read_json("get issue", resp).await?;
        Ok(Some(issue.into()))
    }

    async fn comment(&self, repo: &str, number: u64, body: &str) -> anyhow::Result<IssueComment> {
        let payload = serde_json::json!({ "body": body });
        let resp = self
            .http
            .post(format!("{}/comments", self.issue_url(repo, number)))
            .json(&payload)
            .send()
            .await
            .context("github api create comment request failed")?;

        let comment: GithubComment = read_json("create comment", resp).await?;
        Ok(IssueComment {
            id: comment.id,
            html_url: comment.html_url,
        })
    }

    async fn close(&self, repo: &str, number: u64) -> anyhow::Result<()> {
        self.patch_issue(
            "close issue",
            repo,
            number,
            serde_json::json!({ "state": "closed" }),
        )
        .await
    }

    async fn reopen(&self, repo: &str, number: u64) -> anyhow::Result<()> {
        self.patch_issue(
            "reopen issue",
            repo,
            number,
            serde_json::json!({ "state": "open" }),
        )
        .await
    }

    async fn set_body(&self, repo: &str, number: u64, body: &str) -> anyhow::Result<()> {
        self.patch_issue(
            "update issue body",
            repo,
            number,
            serde_json::json!({ "body": body }),
        )
        .await
    }
}

//! GitHub REST API client implementation

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use urlencoding::encode;

use crate::domain::ports::{GitHubClient, GitHubComment, GitHubIssue, GitHubRepo, IssueStateFilter};
use crate::error::GitHubError;

const USER_AGENT: &str = concat!("labelfeed/", env!("CARGO_PKG_VERSION"));

/// Implementation of the GitHub API client
pub struct GitHubClientImpl {
    http: Client,
    base_url: String,
    token: String,
}

impl GitHubClientImpl {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn repo_path(owner: &str, repo: &str) -> String {
        format!("/repos/{}/{}", encode(owner), encode(repo))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self
            .http
            .get(self.api_url(path))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT);

        if self.token.is_empty() {
            request
        } else {
            request.header("Authorization", format!("token {}", self.token))
        }
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, GitHubError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| GitHubError::Deserialization(e.to_string()))
        } else if status.as_u16() == 401 {
            Err(GitHubError::Unauthorized)
        } else if status.as_u16() == 429 || rate_limit_exhausted(&response) {
            Err(GitHubError::RateLimited)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// GitHub signals primary rate limits with a 403 and no remaining quota
fn rate_limit_exhausted(response: &reqwest::Response) -> bool {
    response.status().as_u16() == 403
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "0")
            .unwrap_or(false)
}

#[async_trait]
impl GitHubClient for GitHubClientImpl {
    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        labels: &[String],
        state: IssueStateFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<GitHubIssue>, GitHubError> {
        let resp = self
            .get(&format!("{}/issues", Self::repo_path(owner, repo)))
            .query(&[
                ("labels", labels.join(",")),
                ("state", state.as_str().to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await?;

        self.handle_response(resp).await
    }

    async fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        number: i64,
        since: DateTime<Utc>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<GitHubComment>, GitHubError> {
        let resp = self
            .get(&format!(
                "{}/issues/{}/comments",
                Self::repo_path(owner, repo),
                number
            ))
            .query(&[
                ("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await?;

        self.handle_response(resp).await
    }

    async fn get_repo(&self, owner: &str, repo: &str) -> Result<GitHubRepo, GitHubError> {
        let resp = self.get(&Self::repo_path(owner, repo)).send().await?;

        if resp.status().as_u16() == 404 {
            return Err(GitHubError::RepoNotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
            });
        }

        self.handle_response(resp).await
    }
}

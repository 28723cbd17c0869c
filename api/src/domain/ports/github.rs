//! GitHub client port trait
//!
//! Defines the slice of the GitHub API the scanner depends on: paginated
//! issue and comment listings, plus repository metadata for registration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GitHubError;

/// Helper to deserialize null as default (empty string, etc.)
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// GitHub user representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// Login of an optional user; GitHub returns null for deleted accounts
pub fn login_of(user: &Option<GitHubUser>) -> &str {
    user.as_ref().map(|u| u.login.as_str()).unwrap_or("ghost")
}

/// GitHub repository representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub description: Option<String>,
    pub html_url: String,
    pub owner: GitHubUser,
    pub created_at: DateTime<Utc>,
}

/// GitHub issue representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    /// Globally unique id, stable across renames and transfers
    pub id: i64,
    pub number: i64,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub body: String,
    pub url: String,
    pub html_url: String,
    pub user: Option<GitHubUser>,
    pub created_at: DateTime<Utc>,
    /// Upstream aggregate comment count
    pub comments: u64,
}

/// GitHub issue comment representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubComment {
    pub id: i64,
    pub url: String,
    pub html_url: String,
    pub user: Option<GitHubUser>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Which issue states a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStateFilter {
    Open,
    All,
}

impl IssueStateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStateFilter::Open => "open",
            IssueStateFilter::All => "all",
        }
    }
}

/// Port trait for GitHub API operations
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// List one page of issues carrying every label in `labels`
    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        labels: &[String],
        state: IssueStateFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<GitHubIssue>, GitHubError>;

    /// List one page of comments on an issue, updated at or after `since`
    async fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        number: i64,
        since: DateTime<Utc>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<GitHubComment>, GitHubError>;

    /// Get repository metadata
    async fn get_repo(&self, owner: &str, repo: &str) -> Result<GitHubRepo, GitHubError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_issue_with_null_body() {
        let json = r#"{
            "id": 1001,
            "number": 4,
            "title": "Crash on start",
            "body": null,
            "url": "https://api.github.com/repos/octo/repo/issues/4",
            "html_url": "https://github.com/octo/repo/issues/4",
            "user": {"login": "octocat", "id": 1},
            "created_at": "2024-03-01T10:00:00Z",
            "comments": 3,
            "labels": [{"name": "bug"}]
        }"#;
        let issue: GitHubIssue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.id, 1001);
        assert_eq!(issue.body, "");
        assert_eq!(issue.comments, 3);
        assert_eq!(login_of(&issue.user), "octocat");
    }

    #[test]
    fn parse_comment_from_deleted_user() {
        let json = r#"{
            "id": 55,
            "url": "https://api.github.com/repos/octo/repo/issues/comments/55",
            "html_url": "https://github.com/octo/repo/issues/4#issuecomment-55",
            "user": null,
            "body": "me too",
            "created_at": "2024-03-02T10:00:00Z"
        }"#;
        let comment: GitHubComment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.body, "me too");
        assert_eq!(login_of(&comment.user), "ghost");
    }

    #[test]
    fn parse_repo_without_description() {
        let json = r#"{
            "description": null,
            "html_url": "https://github.com/octo/repo",
            "owner": {"login": "octo"},
            "created_at": "2019-01-01T00:00:00Z"
        }"#;
        let repo: GitHubRepo = serde_json::from_str(json).unwrap();
        assert!(repo.description.is_none());
        assert_eq!(repo.owner.login, "octo");
    }

    #[test]
    fn state_filter_as_str() {
        assert_eq!(IssueStateFilter::Open.as_str(), "open");
        assert_eq!(IssueStateFilter::All.as_str(), "all");
    }
}

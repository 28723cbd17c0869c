//! Mock implementations of port traits
//!
//! In-memory GitHub client that serves configured issues and comments in
//! pages, records what was asked for, and can be told to fail.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::domain::ports::{
    GitHubClient, GitHubComment, GitHubIssue, GitHubRepo, GitHubUser, IssueStateFilter,
};
use crate::error::GitHubError;

/// Key for identifying a repository (owner, repo)
type RepoKey = (String, String);

/// Key for identifying an issue (owner, repo, number)
type IssueNumberKey = (String, String, i64);

/// A stored comment plus the time it was last updated
type StoredComment = (GitHubComment, DateTime<Utc>);

fn repo_key(owner: &str, repo: &str) -> RepoKey {
    (owner.to_string(), repo.to_string())
}

fn page_of<T: Clone>(all: &[T], page: u32, per_page: u32) -> Vec<T> {
    let start = (page.saturating_sub(1) as usize) * per_page as usize;
    all.iter().skip(start).take(per_page as usize).cloned().collect()
}

/// A mock GitHub client that tracks calls and returns configurable responses
#[derive(Default)]
pub struct MockGitHubClient {
    repos: Arc<RwLock<HashMap<RepoKey, GitHubRepo>>>,
    issues: Arc<RwLock<HashMap<RepoKey, Vec<GitHubIssue>>>>,
    comments: Arc<RwLock<HashMap<IssueNumberKey, Vec<StoredComment>>>>,
    failing_repos: Arc<RwLock<HashSet<RepoKey>>>,
    failing_issues: Arc<RwLock<HashSet<i64>>>,
    repo_requests: Arc<RwLock<usize>>,
    comment_requests: Arc<RwLock<usize>>,
    /// Last `since` sent per issue number
    comment_since: Arc<RwLock<HashMap<i64, DateTime<Utc>>>>,
    last_issue_state: Arc<RwLock<Option<IssueStateFilter>>>,
    last_issue_labels: Arc<RwLock<Option<Vec<String>>>>,
}

impl MockGitHubClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure repository metadata
    pub fn with_repo(self, owner: &str, repo: &str, description: Option<&str>) -> Self {
        {
            let mut repos = self.repos.write().unwrap();
            repos.insert(
                repo_key(owner, repo),
                GitHubRepo {
                    description: description.map(String::from),
                    html_url: format!("https://github.com/{}/{}", owner, repo),
                    owner: GitHubUser {
                        login: owner.to_string(),
                    },
                    created_at: Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap(),
                },
            );
        }
        self
    }

    /// Replace the issues listed for a repository
    pub fn set_issues(&self, owner: &str, repo: &str, issues: Vec<GitHubIssue>) {
        self.issues
            .write()
            .unwrap()
            .insert(repo_key(owner, repo), issues);
    }

    /// Replace the comments of an issue; each counts as never edited
    pub fn set_comments(&self, owner: &str, repo: &str, number: i64, comments: Vec<GitHubComment>) {
        let stored = comments
            .into_iter()
            .map(|c| {
                let updated = c.created_at;
                (c, updated)
            })
            .collect();
        self.comments
            .write()
            .unwrap()
            .insert((owner.to_string(), repo.to_string(), number), stored);
    }

    /// Add a comment that was edited at `updated_at`
    pub fn add_edited_comment(
        &self,
        owner: &str,
        repo: &str,
        number: i64,
        comment: GitHubComment,
        updated_at: DateTime<Utc>,
    ) {
        self.comments
            .write()
            .unwrap()
            .entry((owner.to_string(), repo.to_string(), number))
            .or_default()
            .push((comment, updated_at));
    }

    /// Make issue listings for a repository fail
    pub fn fail_issues_for(&self, owner: &str, repo: &str) {
        self.failing_repos
            .write()
            .unwrap()
            .insert(repo_key(owner, repo));
    }

    /// Make comment listings for an issue number fail
    pub fn fail_comments_for(&self, number: i64) {
        self.failing_issues.write().unwrap().insert(number);
    }

    /// Undo every configured failure
    pub fn recover(&self) {
        self.failing_repos.write().unwrap().clear();
        self.failing_issues.write().unwrap().clear();
    }

    pub fn repo_requests(&self) -> usize {
        *self.repo_requests.read().unwrap()
    }

    pub fn comment_requests(&self) -> usize {
        *self.comment_requests.read().unwrap()
    }

    pub fn comment_since(&self, number: i64) -> Option<DateTime<Utc>> {
        self.comment_since.read().unwrap().get(&number).copied()
    }

    pub fn last_issue_state(&self) -> Option<IssueStateFilter> {
        *self.last_issue_state.read().unwrap()
    }

    pub fn last_issue_labels(&self) -> Option<Vec<String>> {
        self.last_issue_labels.read().unwrap().clone()
    }
}

#[async_trait]
impl GitHubClient for MockGitHubClient {
    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        labels: &[String],
        state: IssueStateFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<GitHubIssue>, GitHubError> {
        *self.last_issue_state.write().unwrap() = Some(state);
        *self.last_issue_labels.write().unwrap() = Some(labels.to_vec());

        if self
            .failing_repos
            .read()
            .unwrap()
            .contains(&repo_key(owner, repo))
        {
            return Err(GitHubError::Api {
                status: 502,
                message: "Bad gateway".to_string(),
            });
        }

        let issues = self.issues.read().unwrap();
        Ok(issues
            .get(&repo_key(owner, repo))
            .map(|all| page_of(all, page, per_page))
            .unwrap_or_default())
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
        *self.comment_requests.write().unwrap() += 1;
        self.comment_since.write().unwrap().insert(number, since);

        if self.failing_issues.read().unwrap().contains(&number) {
            return Err(GitHubError::Api {
                status: 500,
                message: "Internal error".to_string(),
            });
        }

        // Like GitHub, `since` is inclusive and matches on update time
        let comments = self.comments.read().unwrap();
        let matching: Vec<GitHubComment> = comments
            .get(&(owner.to_string(), repo.to_string(), number))
            .map(|all| {
                all.iter()
                    .filter(|(_, updated)| *updated >= since)
                    .map(|(c, _)| c.clone())
                    .collect()
            })
            .unwrap_or_default();

        Ok(page_of(&matching, page, per_page))
    }

    async fn get_repo(&self, owner: &str, repo: &str) -> Result<GitHubRepo, GitHubError> {
        *self.repo_requests.write().unwrap() += 1;

        self.repos
            .read()
            .unwrap()
            .get(&repo_key(owner, repo))
            .cloned()
            .ok_or_else(|| GitHubError::RepoNotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
            })
    }
}

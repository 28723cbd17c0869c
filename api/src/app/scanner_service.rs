//! Scanner service
//!
//! Runs scan cycles: fetch the labelled issues of a tracked repository,
//! compare them with the stored comment state, and append feed items for
//! new issues and new comments.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::app::pagination::fetch_all;
use crate::domain::entities::{
    CommentTracker, FeedItem, IssueClassification, TrackedRepository,
};
use crate::domain::ports::{login_of, GitHubClient, GitHubComment, GitHubIssue, IssueStateFilter};
use crate::error::GitHubError;

/// What a single scan cycle produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub issues_seen: usize,
    pub new_issues: usize,
    pub new_comments: usize,
}

/// Fetch settings shared by all scan cycles
#[derive(Debug, Clone, Copy)]
pub struct ScanPolicy {
    pub per_page: u32,
    /// Closed issues keep being scanned for new comments
    pub include_closed: bool,
}

impl ScanPolicy {
    fn state_filter(&self) -> IssueStateFilter {
        if self.include_closed {
            IssueStateFilter::All
        } else {
            IssueStateFilter::Open
        }
    }
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            per_page: 100,
            include_closed: false,
        }
    }
}

pub struct ScannerService<GC>
where
    GC: GitHubClient,
{
    github: Arc<GC>,
    policy: ScanPolicy,
}

impl<GC> ScannerService<GC>
where
    GC: GitHubClient,
{
    pub fn new(github: Arc<GC>, policy: ScanPolicy) -> Self {
        Self { github, policy }
    }

    /// Scan every repository in order. A failing repository is logged and
    /// skipped; it never stops the rest of the pass.
    pub async fn run_pass(
        &self,
        repos: &[Arc<TrackedRepository>],
    ) -> Vec<Result<ScanSummary, GitHubError>> {
        let mut outcomes = Vec::with_capacity(repos.len());

        for repo in repos {
            tracing::info!(repo = %repo.key, "Scanning repository");
            let outcome = self.scan_repository(repo).await;
            match &outcome {
                Ok(summary) => tracing::info!(
                    repo = %repo.key,
                    issues = summary.issues_seen,
                    new_issues = summary.new_issues,
                    new_comments = summary.new_comments,
                    "Scan finished"
                ),
                Err(e) => tracing::warn!(repo = %repo.key, error = %e, "Scan failed"),
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    /// One scan cycle over one repository.
    ///
    /// A fetch failure aborts the rest of the cycle. State already updated
    /// for earlier issues is kept, which is safe because re-scanning a
    /// processed issue emits nothing.
    pub async fn scan_repository(
        &self,
        repo: &TrackedRepository,
    ) -> Result<ScanSummary, GitHubError> {
        let per_page = self.policy.per_page;
        let state = self.policy.state_filter();

        let issues = fetch_all(per_page, |page| {
            self.github.list_issues(
                repo.owner(),
                repo.name(),
                repo.labels(),
                state,
                page,
                per_page,
            )
        })
        .await?;

        let mut tracker = repo.comments.lock().await;
        let mut summary = ScanSummary {
            issues_seen: issues.len(),
            ..Default::default()
        };

        for issue in &issues {
            match tracker.classify(issue.id, issue.comments) {
                IssueClassification::New => {
                    tracing::debug!(issue_id = issue.id, title = %issue.title, "Found new issue");
                    repo.feed.append(issue_item(issue));
                    tracker.first_sight(issue.id, issue.created_at);
                    summary.new_issues += 1;
                    summary.new_comments += self.ingest_comments(repo, &mut tracker, issue).await?;
                }
                IssueClassification::Updated => {
                    tracing::debug!(
                        issue_id = issue.id,
                        title = %issue.title,
                        "Issue has new comments"
                    );
                    summary.new_comments += self.ingest_comments(repo, &mut tracker, issue).await?;
                }
                IssueClassification::Unchanged => {}
            }
        }

        tracing::debug!(
            repo = %repo.key,
            tracked_issues = tracker.len(),
            feed_items = repo.feed.len(),
            "Comment state updated"
        );
        Ok(summary)
    }

    /// Append every comment created strictly after the issue's last activity
    async fn ingest_comments(
        &self,
        repo: &TrackedRepository,
        tracker: &mut CommentTracker,
        issue: &GitHubIssue,
    ) -> Result<usize, GitHubError> {
        let Some(state) = tracker.get(issue.id) else {
            return Ok(0);
        };
        let since = state.since();
        let per_page = self.policy.per_page;

        let comments = fetch_all(per_page, |page| {
            self.github.list_comments(
                repo.owner(),
                repo.name(),
                issue.number,
                since,
                page,
                per_page,
            )
        })
        .await?;

        let mut ingested = 0;
        for comment in comments
            .iter()
            .filter(|c| created_after(c, state.last_activity))
        {
            repo.feed.append(comment_item(issue, comment));
            tracker.record_comment(issue.id, comment.created_at);
            ingested += 1;
        }

        Ok(ingested)
    }
}

/// The upstream `since` filter matches on update time, so an edited old
/// comment can come back. Only creation time counts as new.
fn created_after(comment: &GitHubComment, last_activity: DateTime<Utc>) -> bool {
    comment.created_at > last_activity
}

fn issue_item(issue: &GitHubIssue) -> FeedItem {
    FeedItem {
        title: format!("New Issue '{}' with matching labels found", issue.title),
        link: issue.html_url.clone(),
        description: issue.body.clone(),
        author: login_of(&issue.user).to_string(),
        created: issue.created_at,
    }
}

fn comment_item(issue: &GitHubIssue, comment: &GitHubComment) -> FeedItem {
    let author = login_of(&comment.user);
    FeedItem {
        title: format!("New Comment on '{}' from {}", issue.title, author),
        link: comment.html_url.clone(),
        description: comment.body.clone(),
        author: author.to_string(),
        created: comment.created_at,
    }
}

//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::entities::{Feed, RepoKey, TrackedRepository};
use crate::domain::ports::{GitHubComment, GitHubIssue, GitHubUser};

/// Creation time shared by fixture issues
pub fn issue_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

/// Create a test issue opened by `octocat`
pub fn test_issue(id: i64, number: i64, title: &str, comments: u64) -> GitHubIssue {
    GitHubIssue {
        id,
        number,
        title: title.to_string(),
        body: format!("Body of {}", title),
        url: format!("https://api.github.com/repos/octo/repo/issues/{}", number),
        html_url: format!("https://github.com/octo/repo/issues/{}", number),
        user: Some(GitHubUser {
            login: "octocat".to_string(),
        }),
        created_at: issue_created_at(),
        comments,
    }
}

/// Create a test comment
pub fn test_comment(id: i64, login: &str, created_at: DateTime<Utc>) -> GitHubComment {
    GitHubComment {
        id,
        url: format!("https://api.github.com/repos/octo/repo/issues/comments/{}", id),
        html_url: format!("https://github.com/octo/repo/issues/1#issuecomment-{}", id),
        user: Some(GitHubUser {
            login: login.to_string(),
        }),
        body: format!("Comment {} by {}", id, login),
        created_at,
    }
}

/// Key for `owner/name` filtered on the `bug` label
pub fn test_key(owner: &str, name: &str) -> RepoKey {
    RepoKey::new(owner, name, vec!["bug".to_string()])
}

/// Create an empty feed header
pub fn test_feed(name: &str) -> Feed {
    Feed::new(
        format!("octo/{} Labels: [bug]", name),
        format!("https://github.com/octo/{}", name),
        "no description given",
        "octo",
        Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap(),
    )
}

/// Create a tracked repository with an empty feed and no comment state
pub fn test_tracked_repo(owner: &str, name: &str) -> TrackedRepository {
    TrackedRepository::new(test_key(owner, name), test_feed(name))
}

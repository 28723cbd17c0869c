//! Feed service
//!
//! Registers repositories for tracking and resolves public feed tokens
//! to feed snapshots for rendering.

use std::sync::Arc;

use regex::Regex;

use crate::app::feed_registry::FeedRegistry;
use crate::domain::entities::{Feed, RepoKey};
use crate::domain::ports::GitHubClient;
use crate::error::AppError;

const NO_DESCRIPTION: &str = "no description given";

/// Service for registering and reading feeds
pub struct FeedService<GC>
where
    GC: GitHubClient,
{
    github: Arc<GC>,
    registry: Arc<FeedRegistry>,
}

impl<GC> FeedService<GC>
where
    GC: GitHubClient,
{
    pub fn new(github: Arc<GC>, registry: Arc<FeedRegistry>) -> Self {
        Self { github, registry }
    }

    pub fn registry(&self) -> &Arc<FeedRegistry> {
        &self.registry
    }

    /// Start tracking issues of `owner/repo` carrying all of `labels`.
    ///
    /// Repository metadata is fetched first; nothing is registered if that
    /// fails. Registering a known (owner, repo, labels) returns its token.
    pub async fn register_repository(
        &self,
        owner: &str,
        repo: &str,
        labels: Vec<String>,
    ) -> Result<String, AppError> {
        validate_owner(owner)?;
        validate_repo(repo)?;

        let key = RepoKey::new(owner, repo, labels);
        if key.labels.is_empty() {
            return Err(AppError::BadRequest(
                "At least one label is required".to_string(),
            ));
        }

        if let Some(token) = self.registry.find(&key) {
            tracing::debug!(repo = %key, "Repository already registered");
            return Ok(token);
        }

        let metadata = self.github.get_repo(owner, repo).await?;

        let feed = Feed::new(
            format!("{}/{} Labels: [{}]", owner, repo, key.labels.join(", ")),
            metadata.html_url,
            metadata
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            metadata.owner.login,
            metadata.created_at,
        );

        let repo_label = key.to_string();
        let registration = self.registry.register(key, feed)?;
        if registration.created {
            tracing::info!(
                feed = %registration.token,
                repo = %repo_label,
                "Created new feed"
            );
        }

        Ok(registration.token)
    }

    /// Snapshot of the feed behind a token
    pub fn resolve_feed(&self, token: &str) -> Result<Feed, AppError> {
        let repo = self.registry.resolve(token)?;
        Ok(repo.feed.snapshot())
    }
}

/// GitHub user and organisation names
fn validate_owner(owner: &str) -> Result<(), AppError> {
    let re = Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,38})$")
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if re.is_match(owner) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid owner: {}", owner)))
    }
}

fn validate_repo(repo: &str) -> Result<(), AppError> {
    let re = Regex::new(r"^[A-Za-z0-9._-]{1,100}$").map_err(|e| AppError::Internal(e.to_string()))?;
    if re.is_match(repo) && repo != "." && repo != ".." {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid repository: {}", repo)))
    }
}

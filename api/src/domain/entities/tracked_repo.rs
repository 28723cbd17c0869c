//! Tracked repository entity
//!
//! One registration of (owner, name, label set) with its own feed stream
//! and comment state. Lives for the whole process lifetime.

use std::fmt;

use tokio::sync::Mutex;

use super::{CommentTracker, Feed, FeedStream};

/// Identity of a registration. Labels are normalised so that the same
/// set in a different order maps to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoKey {
    pub owner: String,
    pub name: String,
    pub labels: Vec<String>,
}

impl RepoKey {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, labels: Vec<String>) -> Self {
        let mut labels: Vec<String> = labels
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        labels.sort();
        labels.dedup();

        Self {
            owner: owner.into(),
            name: name.into(),
            labels,
        }
    }
}

impl fmt::Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}, [{}]", self.owner, self.name, self.labels.join(", "))
    }
}

pub struct TrackedRepository {
    pub key: RepoKey,
    pub feed: FeedStream,
    /// Only the scanner locks this, one scan per repository at a time
    pub comments: Mutex<CommentTracker>,
}

impl TrackedRepository {
    pub fn new(key: RepoKey, feed: Feed) -> Self {
        Self {
            key,
            feed: FeedStream::new(feed),
            comments: Mutex::new(CommentTracker::new()),
        }
    }

    pub fn owner(&self) -> &str {
        &self.key.owner
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn labels(&self) -> &[String] {
        &self.key.labels
    }
}

impl fmt::Debug for TrackedRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedRepository")
            .field("key", &self.key)
            .field("items", &self.feed.len())
            .finish()
    }
}

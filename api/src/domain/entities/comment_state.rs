//! Per-issue comment state
//!
//! Remembers, for every issue that has been emitted into a feed, how many
//! comments were ingested and when the latest activity happened. This is
//! all the history needed to tell new items from already-seen ones.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Resolution of the upstream `since` filter. The filter is inclusive, so
/// the lower bound is pushed forward by one unit to make it exclusive.
pub const SINCE_RESOLUTION_SECS: i64 = 1;

/// Upstream-unique issue identity (not the per-repository issue number)
pub type IssueKey = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentState {
    /// Comments ingested so far
    pub count: u64,
    /// Issue creation time on first sight, then the latest ingested comment
    pub last_activity: DateTime<Utc>,
}

impl CommentState {
    /// Lower bound for the next comment fetch (exclusive of `last_activity`)
    pub fn since(&self) -> DateTime<Utc> {
        self.last_activity + Duration::seconds(SINCE_RESOLUTION_SECS)
    }
}

/// How an upstream issue relates to what has been seen before
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueClassification {
    /// Never emitted: emit the issue, then ingest its comments
    New,
    /// Upstream reports more comments than were ingested
    Updated,
    Unchanged,
}

#[derive(Debug, Default)]
pub struct CommentTracker {
    issues: HashMap<IssueKey, CommentState>,
}

impl CommentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&self, issue: IssueKey, upstream_count: u64) -> IssueClassification {
        match self.issues.get(&issue) {
            None => IssueClassification::New,
            Some(state) if upstream_count > state.count => IssueClassification::Updated,
            Some(_) => IssueClassification::Unchanged,
        }
    }

    /// Start tracking an issue. Existing state is left untouched.
    pub fn first_sight(&mut self, issue: IssueKey, created_at: DateTime<Utc>) -> CommentState {
        *self.issues.entry(issue).or_insert(CommentState {
            count: 0,
            last_activity: created_at,
        })
    }

    /// Count one ingested comment. Returns false for untracked issues.
    pub fn record_comment(&mut self, issue: IssueKey, created_at: DateTime<Utc>) -> bool {
        match self.issues.get_mut(&issue) {
            Some(state) => {
                state.count += 1;
                state.last_activity = state.last_activity.max(created_at);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, issue: IssueKey) -> Option<CommentState> {
        self.issues.get(&issue).copied()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

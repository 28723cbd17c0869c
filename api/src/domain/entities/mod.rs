//! Domain entities
//!
//! Pure domain models for tracked repositories, their comment state,
//! and the feeds they produce.

pub mod comment_state;
pub mod feed;
pub mod tracked_repo;

pub use comment_state::{CommentTracker, IssueClassification};
pub use feed::{Feed, FeedItem, FeedStream};
pub use tracked_repo::{RepoKey, TrackedRepository};

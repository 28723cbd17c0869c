//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod github;

pub use github::{
    login_of, GitHubClient, GitHubComment, GitHubIssue, GitHubRepo, GitHubUser,
    IssueStateFilter,
};

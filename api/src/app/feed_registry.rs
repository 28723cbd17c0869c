//! Feed registry
//!
//! Owns the ordered list of tracked repositories and maps public feed
//! tokens to positions in that list. Registrations are append-only.

use std::sync::{Arc, PoisonError, RwLock};

use crate::app::feed_token::FeedTokenCodec;
use crate::domain::entities::{Feed, RepoKey, TrackedRepository};
use crate::error::RegistryError;

/// Outcome of a registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub token: String,
    /// False when the key was already registered
    pub created: bool,
}

pub struct FeedRegistry {
    codec: FeedTokenCodec,
    repos: RwLock<Vec<Arc<TrackedRepository>>>,
}

impl FeedRegistry {
    pub fn new(codec: FeedTokenCodec) -> Self {
        Self {
            codec,
            repos: RwLock::new(Vec::new()),
        }
    }

    /// Append a repository and return its token.
    ///
    /// Reading the next index and appending happen under one write lock,
    /// so concurrent registrations never share an index.
    pub fn register(&self, key: RepoKey, feed: Feed) -> Result<Registration, RegistryError> {
        let mut repos = self.repos.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(index) = repos.iter().position(|r| r.key == key) {
            return Ok(Registration {
                token: self.token_for_index(index)?,
                created: false,
            });
        }

        let token = self.token_for_index(repos.len())?;
        repos.push(Arc::new(TrackedRepository::new(key, feed)));

        Ok(Registration {
            token,
            created: true,
        })
    }

    /// Token of an already registered key
    pub fn find(&self, key: &RepoKey) -> Option<String> {
        let repos = self.repos.read().unwrap_or_else(PoisonError::into_inner);
        let index = repos.iter().position(|r| &r.key == key)?;
        self.token_for_index(index).ok()
    }

    pub fn resolve(&self, token: &str) -> Result<Arc<TrackedRepository>, RegistryError> {
        let values = self.codec.decode(token)?;
        let [index] = values.as_slice() else {
            return Err(RegistryError::InvalidToken);
        };
        let index = usize::try_from(*index).map_err(|_| RegistryError::InvalidToken)?;

        self.repos
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
            .ok_or(RegistryError::InvalidToken)
    }

    /// Registered repositories in registration order
    pub fn snapshot(&self) -> Vec<Arc<TrackedRepository>> {
        self.repos
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.repos
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn token_for_index(&self, index: usize) -> Result<String, RegistryError> {
        self.codec.encode(&[index as u64])
    }
}

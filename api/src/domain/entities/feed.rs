//! Feed domain entities
//!
//! A feed is a header plus an append-only, ordered list of items.
//! Insertion order is emission order, not the chronological order of
//! the underlying events.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single syndication entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: String,
    pub created: DateTime<Utc>,
}

/// A feed header together with every item emitted so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: String,
    pub created: DateTime<Utc>,
    pub items: Vec<FeedItem>,
}

impl Feed {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
            author: author.into(),
            created,
            items: Vec::new(),
        }
    }

    /// Timestamp of the newest item, or the feed creation time when empty
    pub fn updated(&self) -> DateTime<Utc> {
        self.items
            .iter()
            .map(|i| i.created)
            .max()
            .map_or(self.created, |latest| latest.max(self.created))
    }
}

/// Shared, append-only feed storage.
///
/// The scanner is the only writer. Readers take a snapshot under the read
/// lock, so they never observe a partially written item.
#[derive(Debug)]
pub struct FeedStream {
    inner: RwLock<Feed>,
}

impl FeedStream {
    pub fn new(feed: Feed) -> Self {
        Self {
            inner: RwLock::new(feed),
        }
    }

    pub fn append(&self, item: FeedItem) {
        let mut feed = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        feed.items.push(item);
    }

    pub fn snapshot(&self) -> Feed {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn item(title: &str, created: DateTime<Utc>) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            link: format!("https://github.com/octo/repo/{}", title),
            description: String::new(),
            author: "octocat".to_string(),
            created,
        }
    }

    fn header() -> Feed {
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        Feed::new("octo/repo", "https://github.com/octo/repo", "desc", "octo", created)
    }

    #[test]
    fn append_preserves_insertion_order() {
        let stream = FeedStream::new(header());
        let now = Utc::now();
        stream.append(item("late", now));
        stream.append(item("early", now - Duration::days(3)));

        let feed = stream.snapshot();
        let titles: Vec<_> = feed.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["late", "early"]);
    }

    #[test]
    fn updated_falls_back_to_created() {
        let feed = header();
        assert_eq!(feed.updated(), feed.created);
    }

    #[test]
    fn updated_uses_newest_item() {
        let stream = FeedStream::new(header());
        let newest = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        stream.append(item("a", newest));
        stream.append(item("b", newest - Duration::hours(1)));
        assert_eq!(stream.snapshot().updated(), newest);
    }

    #[test]
    fn snapshot_is_detached_from_later_appends() {
        let stream = FeedStream::new(header());
        let before = stream.snapshot();
        stream.append(item("a", Utc::now()));
        assert!(before.items.is_empty());
        assert_eq!(stream.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_readers_see_whole_items() {
        let stream = Arc::new(FeedStream::new(header()));
        let writer = {
            let stream = stream.clone();
            tokio::spawn(async move {
                for n in 0..200 {
                    stream.append(item(&n.to_string(), Utc::now()));
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..50 {
            let feed = stream.snapshot();
            for (n, entry) in feed.items.iter().enumerate() {
                assert_eq!(entry.title, n.to_string());
            }
            tokio::task::yield_now().await;
        }

        writer.await.unwrap();
        assert_eq!(stream.len(), 200);
    }
}

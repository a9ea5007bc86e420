//! Post listing feed
//!
//! The CMS serves the listing in pages linked by cursor URLs. The feed
//! accumulates those pages in fetch order and tracks the cursor, so callers
//! can walk the listing page by page (or drain it) without touching the
//! rendering layer.

use super::PostSummary;
use crate::cms::client::CmsError;
use crate::cms::document::QueryResponse;

/// One fetched page of post summaries
#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub results: Vec<PostSummary>,
    /// Cursor URL of the following page; `None` when the listing is exhausted
    pub next_page: Option<String>,
}

impl From<QueryResponse> for PostPage {
    fn from(response: QueryResponse) -> Self {
        Self {
            results: response.results.iter().map(PostSummary::from).collect(),
            next_page: response.next_page,
        }
    }
}

/// Issues a single page fetch for a cursor URL.
///
/// Implemented by [`crate::cms::CmsClient`]; tests substitute scripted
/// fakes, which keeps the feed testable without any network or rendering.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<PostPage, CmsError>;
}

/// Accumulating view over the paginated post listing.
///
/// Seeded with the first query page. Each [`Feed::load_more`] appends exactly
/// one further page, existing entries first, new entries after; the list is
/// never truncated or reordered. A failed fetch leaves both the accumulated
/// list and the cursor untouched, so the call can simply be retried. The
/// `&mut` receiver rules out overlapping loads on the same feed.
///
/// Source pages are assumed non-overlapping; duplicate uids across pages are
/// kept as-is.
#[derive(Debug, Clone)]
pub struct Feed {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
}

impl Feed {
    /// Seed the feed with the first page
    pub fn new(first: PostPage) -> Self {
        Self {
            posts: first.results,
            next_page: first.next_page,
        }
    }

    /// Accumulated summaries, in fetch order
    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    /// Cursor of the next page, if any
    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Whether a further page exists; drives the "load more" control
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Fetch the next page and append its results.
    ///
    /// Returns the number of summaries appended. Without a cursor this is a
    /// no-op: no request is issued and `Ok(0)` is returned.
    pub async fn load_more<F: PageFetcher>(&mut self, fetcher: &F) -> Result<usize, CmsError> {
        let Some(url) = self.next_page.clone() else {
            return Ok(0);
        };

        let page = fetcher.fetch_page(&url).await?;
        let appended = page.results.len();
        self.posts.extend(page.results);
        self.next_page = page.next_page;
        Ok(appended)
    }

    /// Follow the cursor until the listing is exhausted, one fetch per page
    pub async fn load_all<F: PageFetcher>(&mut self, fetcher: &F) -> Result<(), CmsError> {
        while self.has_more() {
            self.load_more(fetcher).await?;
        }
        Ok(())
    }

    pub fn into_posts(self) -> Vec<PostSummary> {
        self.posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::cell::RefCell;

    /// Serves a scripted sequence of pages and counts fetches
    struct ScriptedFetcher {
        pages: RefCell<Vec<Result<PostPage, CmsError>>>,
        calls: RefCell<usize>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<Result<PostPage, CmsError>>) -> Self {
            Self {
                pages: RefCell::new(pages),
                calls: RefCell::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl PageFetcher for ScriptedFetcher {
        async fn fetch_page(&self, _url: &str) -> Result<PostPage, CmsError> {
            *self.calls.borrow_mut() += 1;
            self.pages.borrow_mut().remove(0)
        }
    }

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: None,
            title: format!("Post {}", uid),
            subtitle: String::new(),
            author: "Ana".to_string(),
        }
    }

    fn page(uids: &[&str], next: Option<&str>) -> PostPage {
        PostPage {
            results: uids.iter().map(|u| summary(u)).collect(),
            next_page: next.map(String::from),
        }
    }

    fn uids(feed: &Feed) -> Vec<&str> {
        feed.posts().iter().map(|p| p.uid.as_str()).collect()
    }

    #[tokio::test]
    async fn test_accumulates_pages_in_fetch_order() {
        let mut feed = Feed::new(page(&["a"], Some("page2")));
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page(&["b", "c"], Some("page3"))),
            Ok(page(&["d"], None)),
        ]);

        assert_eq!(feed.load_more(&fetcher).await.unwrap(), 2);
        assert_eq!(feed.load_more(&fetcher).await.unwrap(), 1);

        assert_eq!(uids(&feed), ["a", "b", "c", "d"]);
        assert_eq!(feed.next_page(), None);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_feed_issues_no_fetch() {
        let mut feed = Feed::new(page(&["a"], None));
        let fetcher = ScriptedFetcher::new(Vec::new());

        assert!(!feed.has_more());
        assert_eq!(feed.load_more(&fetcher).await.unwrap(), 0);
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(uids(&feed), ["a"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_state_retryable() {
        let mut feed = Feed::new(page(&["a"], Some("page2")));
        let fetcher = ScriptedFetcher::new(vec![
            Err(CmsError::Status {
                status: StatusCode::BAD_GATEWAY,
                url: "page2".to_string(),
            }),
            Ok(page(&["b"], None)),
        ]);

        assert!(feed.load_more(&fetcher).await.is_err());
        assert_eq!(uids(&feed), ["a"]);
        assert_eq!(feed.next_page(), Some("page2"));

        // same call again succeeds and appends
        assert_eq!(feed.load_more(&fetcher).await.unwrap(), 1);
        assert_eq!(uids(&feed), ["a", "b"]);
        assert!(!feed.has_more());
    }

    // Overlapping source pages are outside the feed's contract: results are
    // appended as-is, duplicates included. This documents the known gap
    // rather than promising deduplication.
    #[tokio::test]
    async fn test_overlapping_pages_are_not_deduplicated() {
        let mut feed = Feed::new(page(&["a", "b"], Some("page2")));
        let fetcher = ScriptedFetcher::new(vec![Ok(page(&["b", "c"], None))]);

        feed.load_more(&fetcher).await.unwrap();
        assert_eq!(uids(&feed), ["a", "b", "b", "c"]);
    }

    #[tokio::test]
    async fn test_load_all_drains_cursor() {
        let mut feed = Feed::new(page(&["a"], Some("page2")));
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page(&["b"], Some("page3"))),
            Ok(page(&["c"], None)),
        ]);

        feed.load_all(&fetcher).await.unwrap();
        assert_eq!(uids(&feed), ["a", "b", "c"]);
        assert_eq!(fetcher.calls(), 2);
    }
}

//! Syndication feed source adapter (Medium RSS).
//!
//! The feed carries no view counts, descriptions or cover images, so those
//! are filled with defaults here; covers are looked up later by
//! [`crate::cover`]. Entries without a link or publish time are skipped.

use crate::error::{Error, Result};
use crate::http::Fetch;
use crate::models::{Article, ArticleDraft, ArticleSource, ViewCount};
use crate::utils::strip_query;
use feed_rs::model::Entry;
use tracing::{info, instrument, warn};

const SOURCE_NAME: &str = "feed";

/// Build an [`Article`] from one parsed feed entry.
///
/// # Errors
///
/// [`Error::FeedEntry`] when the entry has no usable link or no publish time.
pub fn article_from_entry(entry: &Entry, default_image: &str) -> Result<Article> {
    let skip = |reason: &str| Error::FeedEntry {
        id: entry.id.clone(),
        reason: reason.to_string(),
    };

    let link = entry
        .links
        .iter()
        .map(|l| l.href.trim())
        .find(|href| !href.is_empty())
        .ok_or_else(|| skip("missing link"))?;
    let published = entry.published.ok_or_else(|| skip("missing publish time"))?;

    ArticleDraft {
        source: ArticleSource::Feed,
        title: entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default(),
        id: entry.id.clone(),
        description: String::new(),
        view_count: ViewCount::Unknown,
        tags: entry.categories.iter().map(|c| c.term.clone()).collect(),
        url: strip_query(link).to_string(),
        published_at_raw: String::new(),
        cover_image: None,
        published_instant: Some(published),
    }
    .finish(default_image)
    .map_err(|reason| skip(&reason))
}

/// Parse a feed document and adapt its entries, in feed order.
///
/// Malformed entries are logged and dropped; an unparsable document is an error.
pub fn articles_from_feed(body: &[u8], feed_url: &str, default_image: &str) -> Result<Vec<Article>> {
    let feed = feed_rs::parser::parse(body).map_err(|source| Error::Feed {
        url: feed_url.to_string(),
        source,
    })?;

    let mut articles = Vec::with_capacity(feed.entries.len());
    for entry in &feed.entries {
        match article_from_entry(entry, default_image) {
            Ok(article) => articles.push(article),
            Err(e) => warn!(error = %e, "Feed entry skipped"),
        }
    }
    Ok(articles)
}

/// Fetch the feed and adapt every well-formed entry.
///
/// # Errors
///
/// Transport failures, a non-success status, or an unparsable feed document.
#[instrument(level = "info", skip_all, fields(%feed_url))]
pub async fn fetch_articles<F: Fetch>(fetch: &F, feed_url: &str, default_image: &str) -> Result<Vec<Article>> {
    let page = fetch.get(feed_url, &[]).await?;
    if !page.is_success() {
        return Err(Error::SourceStatus {
            source_name: SOURCE_NAME,
            url: feed_url.to_string(),
            status: page.status,
        });
    }

    let articles = articles_from_feed(page.body.as_bytes(), feed_url, default_image)?;
    info!(count = articles.len(), source = SOURCE_NAME, "Adapted feed articles");
    Ok(articles)
}


#[cfg(test)]
mod tests {
    use super::samples::MEDIUM_RSS;
    use super::*;
    use crate::http::stub::StubFetch;
    use chrono::{TimeZone, Utc};

    const DEFAULT_IMAGE: &str = "img/default-blog-image.webp";

    #[test]
    fn test_adapts_entries_with_defaults() {
        let articles = articles_from_feed(MEDIUM_RSS.as_bytes(), "https://medium.com/feed/@dstarner", DEFAULT_IMAGE)
            .unwrap();
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.source(), ArticleSource::Feed);
        assert_eq!(first.title(), "Exploring Snug Harbor");
        assert_eq!(first.id(), "https://medium.com/p/60f49bc40786");
        assert_eq!(
            first.url(),
            "https://medium.com/@dstarner/exploring-snug-harbor-60f49bc40786"
        );
        assert_eq!(first.tags(), &["travel", "new-york"]);
        assert_eq!(first.view_count(), ViewCount::Unknown);
        assert_eq!(first.description(), "");
        assert_eq!(first.published_at_raw(), "");
        assert_eq!(first.cover_image(), DEFAULT_IMAGE);
        assert_eq!(
            first.published_instant(),
            Utc.with_ymd_and_hms(2020, 8, 1, 14, 3, 11).unwrap()
        );
    }

    #[test]
    fn test_entry_without_publish_time_is_skipped() {
        let articles = articles_from_feed(MEDIUM_RSS.as_bytes(), "https://medium.com/feed/@dstarner", DEFAULT_IMAGE)
            .unwrap();
        assert!(articles.iter().all(|a| a.title() != "Draft without a date"));
    }

    #[test]
    fn test_entry_without_link_is_a_feed_entry_error() {
        let mut entry = Entry::default();
        entry.id = "urn:no-link".into();
        entry.published = Some(Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap());

        let err = article_from_entry(&entry, DEFAULT_IMAGE).unwrap_err();
        match err {
            Error::FeedEntry { id, reason } => {
                assert_eq!(id, "urn:no-link");
                assert_eq!(reason, "missing link");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_garbage_feed_is_an_error() {
        let err = articles_from_feed(b"<html>not a feed</html>", "https://medium.com/feed/@x", DEFAULT_IMAGE)
            .unwrap_err();
        assert!(matches!(err, Error::Feed { .. }));
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let stub = StubFetch::new().with_page("https://medium.com/feed/@dstarner", 500, "");
        let err = fetch_articles(&stub, "https://medium.com/feed/@dstarner", DEFAULT_IMAGE)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SourceStatus { status: 500, .. }));
    }
}

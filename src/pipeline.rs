//! The end-to-end sync run.
//!
//! 1. **Fetching**: dev.to listing and the feed, concurrently
//! 2. **Covers**: image lookup for feed articles
//! 3. **Aggregation**: one newest-first list
//! 4. **Output**: render cards, rewrite the page, optional JSON snapshot
//!
//! Any fatal error in steps 1-3 returns before the page is opened, so a
//! failed run never leaves a partially updated document behind.

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::cover::resolve_cover_images;
use crate::error::Result;
use crate::http::Fetch;
use crate::outputs::{html, inject, json};
use crate::sources::{dev_to, feed};
use std::time::Instant;
use tracing::{error, info, instrument};

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub dev_to_articles: usize,
    pub feed_articles: usize,
    /// `None` when the view-count span was not updated.
    pub view_figure: Option<u64>,
    /// 0 means the post markers were missing and nothing was written.
    pub posts_replaced: usize,
    pub view_count_replaced: usize,
}

impl RunReport {
    pub fn markers_found(&self) -> bool {
        self.posts_replaced > 0
    }
}

/// Run the whole sync once against `fetch`.
#[instrument(level = "info", skip_all, fields(index_path = %config.index_path.display()))]
pub async fn run<F: Fetch>(config: &Config, fetch: &F) -> Result<RunReport> {
    let t0 = Instant::now();
    let token = config.token()?;

    let (dev_to_articles, feed_articles) = futures::try_join!(
        dev_to::fetch_articles(fetch, &config.dev_to_url, token, &config.default_image),
        feed::fetch_articles(fetch, &config.feed_url, &config.default_image),
    )?;
    let dev_to_count = dev_to_articles.len();
    let feed_count = feed_articles.len();

    let feed_articles = resolve_cover_images(
        fetch,
        feed_articles,
        &config.image_overrides,
        config.fetch_concurrency,
    )
    .await;

    let articles = aggregate(dev_to_articles, feed_articles);
    let fragments = html::render_articles(&articles);
    let view_figure = config
        .update_view_count
        .then(|| inject::view_count_figure(&articles));

    let injection =
        inject::inject_file(&config.index_path, &fragments, view_figure, config.dry_run).await?;

    if let Some(path) = &config.json_output {
        if let Err(e) = json::write_snapshot(&articles, path).await {
            error!(error = %e, "Failed to write JSON snapshot");
        }
    }

    let report = RunReport {
        dev_to_articles: dev_to_count,
        feed_articles: feed_count,
        view_figure,
        posts_replaced: injection.posts_replaced,
        view_count_replaced: injection.view_count_replaced,
    };
    info!(
        dev_to = report.dev_to_articles,
        feed = report.feed_articles,
        total = articles.len(),
        posts_replaced = report.posts_replaced,
        view_count_replaced = report.view_count_replaced,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Sync finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::http::stub::StubFetch;
    use crate::sources::feed::samples::MEDIUM_RSS;
    use serde_json::json;
    use std::path::Path;

    const DEV_TO_URL: &str = "https://dev.to/api/articles/me";
    const FEED_URL: &str = "https://medium.com/feed/@dstarner";
    const SNUG_HARBOR: &str = "https://medium.com/@dstarner/exploring-snug-harbor-60f49bc40786";
    const SIGNALS: &str = "https://medium.com/@dstarner/testing-django-signals-2f3c1a7b8e90";

    const INDEX: &str = r#"<html><body>
<p>Total views: <span id="view-count">0+</span></p>
                        <!-- DONOTREMOVE: BLOG-POSTS -->
                        <!-- /DONOTREMOVE: BLOG-POSTS -->
<footer>untouched</footer>
</body></html>"#;

    fn dev_to_body() -> String {
        json!([
            {
                "id": 1, "title": "Newest dev.to post", "description": "", "published": true,
                "page_views_count": 1200, "tag_list": ["rust"],
                "url": "https://dev.to/dstarner/newest", "published_timestamp": "2024-06-03T08:00:00Z",
                "cover_image": null
            },
            {
                "id": 2, "title": "Unpublished", "published": false
            },
            {
                "id": 3, "title": "Older dev.to post", "description": "d", "published": true,
                "page_views_count": 340, "tag_list": [],
                "url": "https://dev.to/dstarner/older", "published_timestamp": "2021-01-15T08:00:00Z",
                "cover_image": "https://cdn.dev.to/older.png"
            },
            {
                "id": 4, "title": "Ancient dev.to post", "description": "d", "published": true,
                "page_views_count": 58, "tag_list": [],
                "url": "https://dev.to/dstarner/ancient", "published_timestamp": "2019-01-15T08:00:00Z",
                "cover_image": ""
            }
        ])
        .to_string()
    }

    fn config_for(index_path: &Path) -> Config {
        let mut config = Config {
            index_path: index_path.to_path_buf(),
            dev_to_token: Some("token".into()),
            dev_to_url: DEV_TO_URL.into(),
            feed_url: FEED_URL.into(),
            ..Config::default()
        };
        config
            .image_overrides
            .insert(SNUG_HARBOR.into(), "https://miro.medium.com/override.jpeg".into());
        config
    }

    fn stub(signals_status: u16) -> StubFetch {
        StubFetch::new()
            .with_page(DEV_TO_URL, 200, &dev_to_body())
            .with_page(FEED_URL, 200, MEDIUM_RSS)
            .with_page(
                SIGNALS,
                signals_status,
                r#"<article><img role="presentation" src="https://miro.medium.com/signals.png"></article>"#,
            )
    }

    #[tokio::test]
    async fn test_run_rewrites_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, INDEX).unwrap();

        let report = run(&config_for(&path), &stub(200)).await.unwrap();
        assert_eq!(report.dev_to_articles, 3);
        assert_eq!(report.feed_articles, 2);
        assert_eq!(report.posts_replaced, 1);
        assert_eq!(report.view_count_replaced, 1);
        assert_eq!(report.view_figure, Some(2000));

        let page = std::fs::read_to_string(&path).unwrap();
        assert!(page.contains(r#"<span id="view-count">2,000+</span>"#));
        assert!(page.contains("<footer>untouched</footer>"));
        assert!(page.contains("https://miro.medium.com/override.jpeg"));
        assert!(page.contains("https://miro.medium.com/signals.png"));
        assert!(!page.contains("Unpublished"));

        let order: Vec<usize> = [
            "Testing Django Signals",
            "Newest dev.to post",
            "Older dev.to post",
            "Exploring Snug Harbor",
            "Ancient dev.to post",
        ]
        .iter()
        .map(|t| page.find(&format!(r#"<h4 class="blog-item-title">{t}</h4>"#)).unwrap())
        .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, INDEX).unwrap();
        let config = config_for(&path);

        run(&config, &stub(200)).await.unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        run(&config, &stub(200)).await.unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_image_fetch_failure_keeps_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, INDEX).unwrap();
        let config = config_for(&path);

        let report = run(&config, &stub(503)).await.unwrap();
        assert_eq!(report.posts_replaced, 1);

        let page = std::fs::read_to_string(&path).unwrap();
        assert!(!page.contains("signals.png"));
        let signals_card = &page[..page.find("Testing Django Signals").unwrap()];
        let last_img = signals_card.rfind("<img src=").unwrap();
        assert!(signals_card[last_img..].starts_with(&format!(r#"<img src="{}""#, config.default_image)));
    }

    #[tokio::test]
    async fn test_malformed_record_aborts_before_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, INDEX).unwrap();

        let body = json!([{ "id": 9, "published": true, "url": "https://dev.to/x" }]).to_string();
        let fetch = StubFetch::new()
            .with_page(DEV_TO_URL, 200, &body)
            .with_page(FEED_URL, 200, MEDIUM_RSS);

        let err = run(&config_for(&path), &fetch).await.unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { index: 0, .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), INDEX);
    }

    #[tokio::test]
    async fn test_unreachable_feed_aborts_before_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, INDEX).unwrap();

        let fetch = StubFetch::new().with_page(DEV_TO_URL, 200, &dev_to_body());
        assert!(run(&config_for(&path), &fetch).await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), INDEX);
    }

    #[tokio::test]
    async fn test_missing_markers_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "<html>no markers here</html>").unwrap();

        let report = run(&config_for(&path), &stub(200)).await.unwrap();
        assert!(!report.markers_found());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "<html>no markers here</html>"
        );
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            dev_to_token: None,
            ..config_for(&dir.path().join("index.html"))
        };
        let fetch = stub(200);

        assert!(matches!(run(&config, &fetch).await, Err(Error::MissingCredential(_))));
        assert!(fetch.requested_urls().is_empty());
    }

    #[tokio::test]
    async fn test_json_snapshot_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, INDEX).unwrap();
        let snapshot = dir.path().join("articles.json");
        let config = Config {
            json_output: Some(snapshot.clone()),
            ..config_for(&path)
        };

        run(&config, &stub(200)).await.unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&snapshot).unwrap()).unwrap();
        assert_eq!(value["articles"].as_array().unwrap().len(), 5);
        assert_eq!(value["total_views"], 1598);
    }
}

//! Cover image discovery for feed-derived articles.
//!
//! The feed does not carry images, so each feed article starts with the
//! placeholder. For each one, first match wins:
//!
//! 1. an exact URL match in the configured override table
//! 2. the first `img[role="presentation"]` inside the page's first `<article>`
//!
//! Every failure (transport, non-success status, missing markup) is logged
//! and leaves the placeholder in place. dev.to articles pass through untouched.

use crate::error::{Error, Result};
use crate::http::Fetch;
use crate::models::{Article, ArticleSource};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Article URL (query stripped) to cover image URL.
pub type ImageOverrides = BTreeMap<String, String>;

static ARTICLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("static selector"));
static PRESENTATION_IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"img[role="presentation"]"#).expect("static selector"));

/// Extract the presentation image from an article page.
///
/// Relative `src` values are resolved against `page_url`; absolute ones are
/// returned exactly as written.
pub fn presentation_image(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let article = document.select(&ARTICLE_SELECTOR).next()?;
    let src = article
        .select(&PRESENTATION_IMG_SELECTOR)
        .next()?
        .value()
        .attr("src")?
        .trim();
    if src.is_empty() {
        return None;
    }

    let resolved = match Url::parse(src) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(page_url)
            .and_then(|base| base.join(src))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| src.to_string()),
        _ => src.to_string(),
    };
    Some(resolved)
}

/// Look up the cover image for one feed article.
///
/// # Errors
///
/// [`Error::ImageResolution`] describing why no image was found.
#[instrument(level = "debug", skip_all, fields(url = %article.url()))]
pub async fn find_cover_image<F: Fetch>(
    fetch: &F,
    article: &Article,
    overrides: &ImageOverrides,
) -> Result<String> {
    let url = article.url();
    if let Some(image) = overrides.get(url) {
        debug!(%image, "Using cover image override");
        return Ok(image.clone());
    }

    let unresolved = |reason: String| Error::ImageResolution {
        url: url.to_string(),
        reason,
    };

    let page = fetch
        .get(url, &[])
        .await
        .map_err(|e| unresolved(e.to_string()))?;
    if !page.is_success() {
        return Err(unresolved(format!("HTTP {}", page.status)));
    }

    presentation_image(&page.body, url)
        .ok_or_else(|| unresolved("no presentation image inside <article>".into()))
}

/// Resolve cover images for every feed article, keeping input order.
///
/// Up to `concurrency` page fetches run at once. Each result is written back
/// only to the article it was fetched for.
#[instrument(level = "info", skip_all, fields(count = articles.len()))]
pub async fn resolve_cover_images<F: Fetch>(
    fetch: &F,
    articles: Vec<Article>,
    overrides: &ImageOverrides,
    concurrency: usize,
) -> Vec<Article> {
    let resolved: Vec<(Article, bool)> = stream::iter(articles)
        .map(move |mut article| async move {
            if article.source() != ArticleSource::Feed {
                return (article, false);
            }
            match find_cover_image(fetch, &article, overrides).await {
                Ok(image) => {
                    let applied = article.resolve_cover_image(image);
                    (article, applied)
                }
                Err(e) => {
                    warn!(error = %e, "Keeping default cover image");
                    (article, false)
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let found = resolved.iter().filter(|(_, applied)| *applied).count();
    info!(found, total = resolved.len(), "Resolved cover images");
    resolved.into_iter().map(|(article, _)| article).collect()
}

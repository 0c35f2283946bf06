//! Data models for aggregated blog articles.
//!
//! - [`Article`]: the canonical, source-agnostic record used for sorting and rendering
//! - [`ArticleDraft`]: the mutable shape each source adapter fills in before validation
//! - [`ViewCount`]: engagement figure, or an explicit "unknown" for sources without one
//! - [`ArticleSource`]: which adapter produced an article

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Which source adapter constructed an [`Article`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleSource {
    DevTo,
    Feed,
}

/// Page view count as reported by the source.
///
/// `Unknown` is distinct from `Known(0)`: it is excluded from aggregate
/// totals and renders as an empty display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewCount {
    Known(u64),
    Unknown,
}

impl ViewCount {
    pub fn known(&self) -> Option<u64> {
        match self {
            ViewCount::Known(n) => Some(*n),
            ViewCount::Unknown => None,
        }
    }
}

/// Fields gathered by a source adapter, prior to validation.
#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub source: ArticleSource,
    pub title: String,
    pub id: String,
    pub description: String,
    pub view_count: ViewCount,
    pub tags: Vec<String>,
    pub url: String,
    pub published_at_raw: String,
    pub cover_image: Option<String>,
    pub published_instant: Option<DateTime<Utc>>,
}

impl ArticleDraft {
    /// Validate the draft into an [`Article`].
    ///
    /// An empty or missing cover image falls back to `default_image`. A
    /// missing publication instant is rejected with a short reason string,
    /// which the caller wraps in its own source-specific error.
    pub fn finish(self, default_image: &str) -> Result<Article, String> {
        let published_instant = self
            .published_instant
            .ok_or_else(|| "no publication date".to_string())?;

        let cover_image = match self.cover_image {
            Some(img) if !img.trim().is_empty() => img,
            _ => default_image.to_string(),
        };

        Ok(Article {
            source: self.source,
            title: self.title,
            id: self.id,
            description: self.description,
            view_count: self.view_count,
            tags: self.tags,
            url: self.url,
            published: true,
            published_at_raw: self.published_at_raw,
            cover_image,
            cover_resolved: false,
            published_instant,
        })
    }
}

/// A published article, normalized from either source.
///
/// Everything but the cover image is fixed at construction. The cover image
/// may be replaced once, and only on feed-derived articles, via
/// [`Article::resolve_cover_image`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    source: ArticleSource,
    title: String,
    id: String,
    description: String,
    view_count: ViewCount,
    tags: Vec<String>,
    url: String,
    /// Unpublished records are filtered out before construction.
    published: bool,
    published_at_raw: String,
    cover_image: String,
    #[serde(skip)]
    cover_resolved: bool,
    published_instant: DateTime<Utc>,
}

impl Article {
    pub fn source(&self) -> ArticleSource {
        self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn view_count(&self) -> ViewCount {
        self.view_count
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn published_at_raw(&self) -> &str {
        &self.published_at_raw
    }

    pub fn cover_image(&self) -> &str {
        &self.cover_image
    }

    pub fn published_instant(&self) -> DateTime<Utc> {
        self.published_instant
    }

    /// Replace the placeholder cover image with a discovered one.
    ///
    /// Returns `false` (and leaves the article untouched) for dev.to
    /// articles, for an empty `image`, or when a cover was already resolved.
    pub fn resolve_cover_image(&mut self, image: String) -> bool {
        if self.source != ArticleSource::Feed || self.cover_resolved || image.trim().is_empty() {
            return false;
        }
        self.cover_image = image;
        self.cover_resolved = true;
        true
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Build a valid article for tests; `day` is a day of June 2024.
    pub fn article(source: ArticleSource, id: &str, day: u32, views: ViewCount) -> Article {
        ArticleDraft {
            source,
            title: format!("Article {id}"),
            id: id.to_string(),
            description: String::new(),
            view_count: views,
            tags: vec![],
            url: format!("https://example.com/{id}"),
            published_at_raw: String::new(),
            cover_image: None,
            published_instant: Some(Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()),
        }
        .finish("img/default.webp")
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::article;
    use super::*;
    use chrono::TimeZone;

    fn draft(source: ArticleSource) -> ArticleDraft {
        ArticleDraft {
            source,
            title: "Exploring Snug Harbor".into(),
            id: "60f49bc40786".into(),
            description: String::new(),
            view_count: ViewCount::Unknown,
            tags: vec!["travel".into()],
            url: "https://medium.com/@dstarner/exploring-snug-harbor-60f49bc40786".into(),
            published_at_raw: String::new(),
            cover_image: None,
            published_instant: Some(Utc.with_ymd_and_hms(2020, 8, 1, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_finish_requires_published_instant() {
        let mut d = draft(ArticleSource::Feed);
        d.published_instant = None;
        assert!(d.finish("img/default.webp").is_err());
    }

    #[test]
    fn test_finish_defaults_empty_cover_image() {
        let mut d = draft(ArticleSource::DevTo);
        d.cover_image = Some("   ".into());
        let a = d.finish("img/default.webp").unwrap();
        assert_eq!(a.cover_image(), "img/default.webp");

        let a = draft(ArticleSource::DevTo).finish("img/default.webp").unwrap();
        assert_eq!(a.cover_image(), "img/default.webp");
    }

    #[test]
    fn test_finish_keeps_supplied_cover_image() {
        let mut d = draft(ArticleSource::DevTo);
        d.cover_image = Some("https://cdn.dev.to/cover.png".into());
        let a = d.finish("img/default.webp").unwrap();
        assert_eq!(a.cover_image(), "https://cdn.dev.to/cover.png");
    }

    #[test]
    fn test_cover_image_resolves_once_for_feed_articles() {
        let mut a = article(ArticleSource::Feed, "m1", 3, ViewCount::Unknown);
        assert!(a.resolve_cover_image("https://miro.medium.com/a.jpeg".into()));
        assert!(!a.resolve_cover_image("https://miro.medium.com/b.jpeg".into()));
        assert_eq!(a.cover_image(), "https://miro.medium.com/a.jpeg");
    }

    #[test]
    fn test_cover_image_is_fixed_for_dev_to_articles() {
        let mut a = article(ArticleSource::DevTo, "d1", 3, ViewCount::Known(10));
        assert!(!a.resolve_cover_image("https://miro.medium.com/a.jpeg".into()));
        assert_eq!(a.cover_image(), "img/default.webp");
    }

    #[test]
    fn test_view_count_known() {
        assert_eq!(ViewCount::Known(0).known(), Some(0));
        assert_eq!(ViewCount::Unknown.known(), None);
    }

    #[test]
    fn test_article_serialization() {
        let a = article(ArticleSource::Feed, "m1", 3, ViewCount::Unknown);
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"source\":\"feed\""));
        assert!(json.contains("\"view_count\":\"unknown\""));
        assert!(json.contains("\"published\":true"));
        assert!(!json.contains("cover_resolved"));
    }
}

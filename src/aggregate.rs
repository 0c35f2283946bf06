//! Merge the per-source article lists into one newest-first list.

use crate::models::Article;
use itertools::Itertools;
use tracing::{debug, instrument};

/// Concatenate dev.to articles then feed articles and sort newest first.
///
/// The sort is stable: articles published at the same instant keep their
/// concatenation order. Nothing is deduplicated, so a post cross-posted to
/// both sources appears twice.
#[instrument(level = "info", skip_all, fields(dev_to = dev_to.len(), feed = feed.len()))]
pub fn aggregate(dev_to: Vec<Article>, feed: Vec<Article>) -> Vec<Article> {
    let articles: Vec<Article> = dev_to
        .into_iter()
        .chain(feed)
        .sorted_by(|a, b| b.published_instant().cmp(&a.published_instant()))
        .collect();
    for (position, a) in articles.iter().enumerate() {
        debug!(
            position,
            id = a.id(),
            source = ?a.source(),
            published_at_raw = a.published_at_raw(),
            published = %a.published_instant(),
            has_description = !a.description().is_empty(),
            "Ordered article"
        );
    }
    articles
}

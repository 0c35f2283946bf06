//! JSON snapshot of the aggregated article list.
//!
//! Optional side output, written next to (never instead of) the page
//! rewrite. Useful for checking what a run picked up from each source.
//!
//! ```text
//! {
//!   "generated_at": "2024-06-03T10:00:00Z",
//!   "total_views": 1598,
//!   "articles": [ { "source": "dev_to", "title": "...", ... }, ... ]
//! }
//! ```

use crate::error::{Error, Result};
use crate::models::Article;
use crate::outputs::inject::total_views;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub generated_at: DateTime<Utc>,
    pub total_views: u64,
    pub articles: &'a [Article],
}

impl<'a> Snapshot<'a> {
    pub fn new(articles: &'a [Article], generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            total_views: total_views(articles),
            articles,
        }
    }
}

/// Serialize the ordered article list to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_snapshot(articles: &[Article], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&Snapshot::new(articles, Utc::now()))?;

    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).await.map_err(|source| Error::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).await.map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(count = articles.len(), "Wrote JSON snapshot");
    Ok(())
}

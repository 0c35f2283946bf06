//! Marker-delimited rewriting of the site's index page.
//!
//! The page owns two independently located regions:
//!
//! - **Blog posts**: everything from [`POSTS_BEGIN`] to the last
//!   [`POSTS_END`] after it. The markers themselves are kept.
//! - **View count**: the `id="view-count">…+</span>` span, rewritten with
//!   the rounded total of known view counts.
//!
//! Bytes outside those regions are never touched. Re-running with the same
//! fragments yields the same document. If the post markers are missing,
//! nothing is changed at all and the zero replacement count is reported.
//!
//! Writes go to a temp file in the target's directory and are renamed over
//! the target, so a reader sees either the old page or the new one.

use crate::error::{Error, Result};
use crate::models::Article;
use crate::utils::{format_thousands, round_to_thousand};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

pub const POSTS_BEGIN: &str = "<!-- DONOTREMOVE: BLOG-POSTS -->";
pub const POSTS_END: &str = "<!-- /DONOTREMOVE: BLOG-POSTS -->";

/// Indentation placed before the closing marker.
const POSTS_END_INDENT: &str = "                        ";

static VIEW_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)id="view-count">.*?\+</span>"#).expect("static regex"));

/// Outcome of rewriting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub content: String,
    pub posts_replaced: usize,
    pub view_count_replaced: usize,
}

impl Injection {
    pub fn markers_found(&self) -> bool {
        self.posts_replaced > 0
    }
}

/// Sum of known view counts; unknown counts are left out.
///
/// Saturates at `u64::MAX`.
pub fn total_views(articles: &[Article]) -> u64 {
    articles
        .iter()
        .filter_map(|a| a.view_count().known())
        .fold(0u64, u64::saturating_add)
}

/// Total views rounded to the nearest thousand, as shown on the page.
pub fn view_count_figure(articles: &[Article]) -> u64 {
    round_to_thousand(total_views(articles))
}

/// Rewrite `document` in memory.
///
/// `view_figure` of `None` leaves the view-count span alone.
pub fn inject(document: &str, fragments: &str, view_figure: Option<u64>) -> Injection {
    let Some(begin) = document.find(POSTS_BEGIN) else {
        return Injection {
            content: document.to_string(),
            posts_replaced: 0,
            view_count_replaced: 0,
        };
    };
    let region_start = begin + POSTS_BEGIN.len();
    let end = match document.rfind(POSTS_END) {
        Some(end) if end >= region_start => end,
        _ => {
            return Injection {
                content: document.to_string(),
                posts_replaced: 0,
                view_count_replaced: 0,
            };
        }
    };

    let mut content = String::with_capacity(document.len() + fragments.len());
    content.push_str(&document[..region_start]);
    content.push_str(fragments);
    content.push_str(POSTS_END_INDENT);
    content.push_str(&document[end..]);

    let mut view_count_replaced = 0;
    if let Some(figure) = view_figure {
        view_count_replaced = VIEW_COUNT_RE.find_iter(&content).count();
        if view_count_replaced > 0 {
            let replacement = format!(r#"id="view-count">{}+</span>"#, format_thousands(figure));
            content = VIEW_COUNT_RE
                .replace_all(&content, NoExpand(&replacement))
                .into_owned();
        }
    }

    Injection {
        content,
        posts_replaced: 1,
        view_count_replaced,
    }
}

/// Write `contents` to `path` through a temp file and rename.
///
/// The temp file lives next to the target and takes over its permissions.
/// On any error the target is left as it was.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(write_err)?;
    }
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Read the document at `path`, inject, and write it back unless `dry_run`.
///
/// Nothing is written when the post markers are missing or the content is
/// already up to date.
#[instrument(level = "info", skip_all, fields(path = %path.display(), dry_run = dry_run))]
pub async fn inject_file(
    path: &Path,
    fragments: &str,
    view_figure: Option<u64>,
    dry_run: bool,
) -> Result<Injection> {
    let original = fs::read_to_string(path).await.map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let injection = inject(&original, fragments, view_figure);
    if !injection.markers_found() {
        warn!(
            error = %Error::InjectionNotFound { path: path.to_path_buf() },
            "No replacements performed"
        );
        return Ok(injection);
    }
    if injection.view_count_replaced == 0 && view_figure.is_some() {
        debug!("No view-count span in document");
    }

    if injection.content == original {
        info!("Document already up to date");
        return Ok(injection);
    }
    if dry_run {
        info!(bytes = injection.content.len(), "Dry run; not writing document");
        return Ok(injection);
    }

    let target: PathBuf = path.to_path_buf();
    let contents = injection.content.clone();
    tokio::task::spawn_blocking(move || write_atomically(&target, &contents))
        .await
        .map_err(|e| Error::Write {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })??;

    info!(
        bytes = injection.content.len(),
        view_count_replaced = injection.view_count_replaced,
        "Wrote document"
    );
    Ok(injection)
}

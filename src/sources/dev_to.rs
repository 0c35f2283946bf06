//! dev.to source adapter.
//!
//! Reads the authenticated `/api/articles/me` listing. Each record is a JSON
//! object; unpublished records are dropped before any other field is looked
//! at, and unknown fields are ignored.
//!
//! A published record that cannot be turned into an [`Article`] aborts the
//! run: a half-populated article list would be written over the site.

use crate::error::{Error, Result};
use crate::http::Fetch;
use crate::models::{Article, ArticleDraft, ArticleSource, ViewCount};
use crate::utils::{strip_query, truncate_for_log};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

const SOURCE_NAME: &str = "dev.to";

/// The subset of a dev.to article record this adapter uses.
#[derive(Debug, Deserialize)]
struct DevToRecord {
    title: String,
    id: RecordId,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    page_views_count: Option<u64>,
    #[serde(default)]
    tag_list: Option<TagList>,
    url: String,
    published_timestamp: String,
    #[serde(default)]
    cover_image: Option<String>,
}

/// dev.to ids are integers, but accept strings too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Number(u64),
    Text(String),
}

impl RecordId {
    fn into_string(self) -> String {
        match self {
            RecordId::Number(n) => n.to_string(),
            RecordId::Text(s) => s,
        }
    }
}

/// `/articles/me` returns tags as an array; the public listing joins them with ", ".
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagList {
    List(Vec<String>),
    Joined(String),
}

impl TagList {
    fn into_vec(self) -> Vec<String> {
        match self {
            TagList::List(tags) => tags,
            TagList::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// Parse the date portion (before `T`) of a dev.to timestamp as midnight UTC.
fn parse_published_date(raw: &str) -> Option<DateTime<Utc>> {
    let date = raw.split('T').next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

/// Best-effort id for error messages about records that failed to parse.
fn id_hint(value: &Value) -> String {
    match value.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "<unknown>".to_string(),
    }
}

/// Build an [`Article`] from one raw dev.to record.
///
/// # Returns
///
/// - `Ok(None)` for an unpublished record
/// - `Ok(Some(article))` for a valid published record
///
/// # Errors
///
/// [`Error::MalformedRecord`] if `published` is not a boolean, a required
/// field is missing or mistyped, or the timestamp carries no parsable date.
pub fn article_from_record(index: usize, value: &Value, default_image: &str) -> Result<Option<Article>> {
    let malformed = |reason: String| Error::MalformedRecord {
        index,
        id: id_hint(value),
        reason,
    };

    match value.get("published").and_then(Value::as_bool) {
        Some(true) => {}
        Some(false) => return Ok(None),
        None => return Err(malformed("missing or non-boolean `published`".into())),
    }

    let record = DevToRecord::deserialize(value).map_err(|e| malformed(e.to_string()))?;

    let published_instant = parse_published_date(&record.published_timestamp);
    let draft = ArticleDraft {
        source: ArticleSource::DevTo,
        title: record.title,
        id: record.id.into_string(),
        description: record.description.unwrap_or_default(),
        view_count: record
            .page_views_count
            .map_or(ViewCount::Unknown, ViewCount::Known),
        tags: record.tag_list.map(TagList::into_vec).unwrap_or_default(),
        url: strip_query(&record.url).to_string(),
        published_at_raw: record.published_timestamp,
        cover_image: record.cover_image,
        published_instant,
    };

    draft
        .finish(default_image)
        .map(Some)
        .map_err(|reason| malformed(format!("{reason} in `published_timestamp`")))
}

/// Convert a full `/articles/me` response body into published articles, in
/// response order.
pub fn articles_from_response(body: &str, default_image: &str) -> Result<Vec<Article>> {
    let records: Vec<Value> = serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
        source_name: SOURCE_NAME,
        reason: format!("{e}; body: {}", truncate_for_log(body, 300)),
    })?;

    let mut articles = Vec::with_capacity(records.len());
    for (index, value) in records.iter().enumerate() {
        if let Some(article) = article_from_record(index, value, default_image)? {
            articles.push(article);
        } else {
            debug!(index, id = %id_hint(value), "Skipping unpublished dev.to record");
        }
    }
    Ok(articles)
}

/// Fetch and adapt every published article for the token's account.
///
/// # Errors
///
/// Transport failures, a non-success status, a body that is not a JSON
/// array, or any malformed published record.
#[instrument(level = "info", skip_all, fields(%api_url))]
pub async fn fetch_articles<F: Fetch>(
    fetch: &F,
    api_url: &str,
    token: &str,
    default_image: &str,
) -> Result<Vec<Article>> {
    let page = fetch.get(api_url, &[("api-key", token)]).await?;
    if !page.is_success() {
        return Err(Error::SourceStatus {
            source_name: SOURCE_NAME,
            url: api_url.to_string(),
            status: page.status,
        });
    }

    let articles = articles_from_response(&page.body, default_image)?;
    info!(count = articles.len(), source = SOURCE_NAME, "Adapted dev.to articles");
    Ok(articles)
}

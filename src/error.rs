//! Error kinds raised across the sync pipeline.
//!
//! Only some of these are fatal. [`Error::FeedEntry`] and
//! [`Error::ImageResolution`] are constructed so they can be logged with a
//! consistent message, then dropped; the run continues without them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A published dev.to record is missing a required field or has the wrong shape.
    #[error("malformed dev.to record #{index} (id: {id}): {reason}")]
    MalformedRecord {
        index: usize,
        id: String,
        reason: String,
    },

    /// A feed entry lacks a link or a publish time.
    #[error("skipping feed entry {id}: {reason}")]
    FeedEntry { id: String, reason: String },

    /// Cover image lookup failed for one feed article.
    #[error("could not resolve cover image for {url}: {reason}")]
    ImageResolution { url: String, reason: String },

    /// The blog-post sentinel pair is absent from the target document.
    #[error("blog post markers not found in {}", path.display())]
    InjectionNotFound { path: PathBuf },

    /// An input file (target document or config) could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be written or renamed into place.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport-level request failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A source endpoint answered with a non-success status.
    #[error("{source_name} returned HTTP {status} for {url}")]
    SourceStatus {
        source_name: &'static str,
        url: String,
        status: u16,
    },

    /// A source body was not the expected top-level shape.
    #[error("{source_name} returned an unexpected body: {reason}")]
    MalformedResponse {
        source_name: &'static str,
        reason: String,
    },

    /// The feed document itself could not be parsed.
    #[error("could not parse feed {url}: {source}")]
    Feed {
        url: String,
        #[source]
        source: feed_rs::parser::ParseFeedError,
    },

    /// A required credential was absent or blank.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON encoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

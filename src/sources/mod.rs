//! Source adapters that turn raw upstream records into canonical articles.
//!
//! | Source | Module | Method | Failure policy |
//! |--------|--------|--------|----------------|
//! | dev.to | [`dev_to`] | JSON API (`api-key` header) | any malformed published record aborts the run |
//! | Medium | [`feed`] | RSS via `feed-rs` | malformed entries are skipped with a warning |
//!
//! Each adapter module exports:
//! - a pure construction function for one raw record (`article_from_record`,
//!   `article_from_entry`)
//! - `fetch_articles(fetch, ...)`: one request, then adaptation in source order

pub mod dev_to;
pub mod feed;

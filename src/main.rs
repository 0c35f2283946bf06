//! # article_sync
//!
//! Pulls published articles from dev.to and a Medium RSS feed, merges them
//! into one newest-first list, renders each as a blog card, and splices the
//! cards plus a total view count into a static site's `index.html`.
//!
//! ## Usage
//!
//! ```sh
//! DEV_TO_TOKEN=... article_sync -i ./index.html
//! ```
//!
//! ## Architecture
//!
//! 1. **Sources**: dev.to API records and feed entries become canonical articles
//! 2. **Covers**: feed articles get a cover image from overrides or the article page
//! 3. **Aggregation**: merge and stable-sort newest first
//! 4. **Output**: render cards and rewrite the marked region of the page
//!
//! ## Exit codes
//!
//! - `0`: page rewritten (or already up to date)
//! - `1`: fatal error; the page was not touched
//! - `2`: blog post markers not found in the page; nothing written

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cli;
mod config;
mod cover;
mod error;
mod http;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod utils;

use cli::Cli;
use config::Config;
use http::{HttpFetcher, RetryFetch};

#[tokio::main]
#[instrument]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("article_sync starting up");

    let args = Cli::parse();
    debug!(?args.index_path, ?args.config, dry_run = args.dry_run, "Parsed CLI arguments");

    let config = match Config::resolve(&args).await {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    debug!(?config, "Resolved configuration");

    let fetcher = match HttpFetcher::new(config.timeout()) {
        Ok(f) => RetryFetch::new(f, config.max_retries, config.retry_base_delay()),
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let report = match pipeline::run(&config, &fetcher).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Sync aborted; index page left unchanged");
            return ExitCode::FAILURE;
        }
    };

    let elapsed = start_time.elapsed();
    if !report.markers_found() {
        warn!(
            path = %config.index_path.display(),
            ?elapsed,
            "Blog post markers missing; nothing was written"
        );
        return ExitCode::from(2);
    }

    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    ExitCode::SUCCESS
}

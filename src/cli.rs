//! Command-line interface definitions for article_sync.
//!
//! Every flag is optional; unset flags fall back to the YAML config file (if
//! one is given) and then to built-in defaults. See [`crate::config`].

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for article_sync.
///
/// # Examples
///
/// ```sh
/// # Rewrite ./index.html using DEV_TO_TOKEN from the environment
/// article_sync
///
/// # Explicit page and config file, preview only
/// article_sync -i site/index.html -c article_sync.yaml --dry-run
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// HTML page containing the blog post markers
    #[arg(short, long)]
    pub index_path: Option<PathBuf>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// dev.to API key
    #[arg(long, env = "DEV_TO_TOKEN", hide_env_values = true)]
    pub dev_to_token: Option<String>,

    /// dev.to endpoint listing the account's articles
    #[arg(long)]
    pub dev_to_url: Option<String>,

    /// RSS/Atom feed with the remaining articles
    #[arg(long)]
    pub feed_url: Option<String>,

    /// Cover image used when an article has none
    #[arg(long)]
    pub default_image: Option<String>,

    /// Also write the aggregated article list as JSON to this path
    #[arg(short, long)]
    pub json_output: Option<PathBuf>,

    /// Leave the view-count span untouched
    #[arg(long)]
    pub skip_view_count: bool,

    /// Fetch and render everything but do not write the page
    #[arg(long)]
    pub dry_run: bool,
}

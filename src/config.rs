//! Run configuration.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. an optional YAML file (`--config`)
//! 3. command-line flags and `DEV_TO_TOKEN`
//!
//! ```yaml
//! index_path: ./index.html
//! feed_url: https://medium.com/feed/@dstarner
//! default_image: img/default-blog-image.webp
//! image_overrides:
//!   https://medium.com/@dstarner/exploring-snug-harbor-60f49bc40786: https://miro.medium.com/max/4000/1*m60t2-xheDbpcutjclU4lg.jpeg
//! timeout_secs: 15
//! ```

use crate::cli::Cli;
use crate::cover::ImageOverrides;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub index_path: PathBuf,
    pub dev_to_url: String,
    pub dev_to_token: Option<String>,
    pub feed_url: String,
    pub default_image: String,
    pub image_overrides: ImageOverrides,
    pub update_view_count: bool,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
    pub fetch_concurrency: usize,
    pub json_output: Option<PathBuf>,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("./index.html"),
            dev_to_url: "https://dev.to/api/articles/me".to_string(),
            dev_to_token: None,
            feed_url: "https://medium.com/feed/@dstarner".to_string(),
            default_image: "img/default-blog-image.webp".to_string(),
            image_overrides: ImageOverrides::new(),
            update_view_count: true,
            timeout_secs: 15,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            fetch_concurrency: 4,
            json_output: None,
            dry_run: false,
        }
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("index_path", &self.index_path)
            .field("dev_to_url", &self.dev_to_url)
            .field("dev_to_token", &self.dev_to_token.as_ref().map(|_| "<redacted>"))
            .field("feed_url", &self.feed_url)
            .field("default_image", &self.default_image)
            .field("image_overrides", &self.image_overrides.len())
            .field("update_view_count", &self.update_view_count)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .field("json_output", &self.json_output)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self> {
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_yaml_str(&yaml)?;
        info!(overrides = config.image_overrides.len(), "Loaded configuration");
        Ok(config)
    }

    /// Build the effective configuration from CLI flags and the optional file.
    pub async fn resolve(cli: &Cli) -> Result<Self> {
        let base = match &cli.config {
            Some(path) => Self::load(path).await?,
            None => Self::default(),
        };
        let config = base.with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Apply flags that were given on the command line.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(p) = &cli.index_path {
            self.index_path = p.clone();
        }
        if let Some(t) = &cli.dev_to_token {
            self.dev_to_token = Some(t.clone());
        }
        if let Some(u) = &cli.dev_to_url {
            self.dev_to_url = u.clone();
        }
        if let Some(u) = &cli.feed_url {
            self.feed_url = u.clone();
        }
        if let Some(img) = &cli.default_image {
            self.default_image = img.clone();
        }
        if let Some(p) = &cli.json_output {
            self.json_output = Some(p.clone());
        }
        if cli.skip_view_count {
            self.update_view_count = false;
        }
        if cli.dry_run {
            self.dry_run = true;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_image.trim().is_empty() {
            return Err(Error::Config("default_image must not be empty".into()));
        }
        if self.fetch_concurrency == 0 {
            return Err(Error::Config("fetch_concurrency must be at least 1".into()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// The dev.to API key, required for every run.
    pub fn token(&self) -> Result<&str> {
        self.dev_to_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(Error::MissingCredential("DEV_TO_TOKEN (or dev_to_token in the config file)"))
    }
}

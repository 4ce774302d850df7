//! Configuration for the GBIF explorer.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the GBIF API.
    pub const BASE_URL: &str = "https://api.gbif.org/v1";

    /// Public occurrence page on gbif.org.
    pub const OCCURRENCE_PAGE_URL: &str = "https://www.gbif.org/occurrence";

    /// Records per search request (GBIF caps `limit` at 300).
    pub const SEARCH_LIMIT: u32 = 300;

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Attempts per page before giving up.
    pub const MAX_RETRIES: u32 = 3;

    /// Fixed delay between attempts.
    pub const RETRY_DELAY: Duration = Duration::from_secs(2);
}

/// Display configuration constants.
pub mod display {
    /// Rows per page on the results view.
    pub const RESULTS_PER_PAGE: usize = 50;

    /// Number of searches shown on the index page.
    pub const RECENT_SEARCHES: i64 = 10;
}

/// Default SQLite database location.
pub const DEFAULT_DATABASE_PATH: &str = "instance/gbif_explorer.db";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the GBIF API (overridable for mock servers).
    pub api_base_url: String,

    /// Page size for occurrence search requests.
    pub search_limit: u32,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Attempts per page before the fetch fails.
    pub max_retries: u32,

    /// Delay between attempts.
    pub retry_delay: Duration,

    /// Rows per page on the results view.
    pub results_per_page: usize,

    /// SQLite database file.
    pub database_path: PathBuf,
}

impl Config {
    /// Create a configuration with production defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_base_url: api::BASE_URL.to_string(),
            search_limit: api::SEARCH_LIMIT,
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            max_retries: api::MAX_RETRIES,
            retry_delay: api::RETRY_DELAY,
            results_per_page: display::RESULTS_PER_PAGE,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            retry_delay: Duration::from_millis(0), // No delay in tests
            ..Self::new()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Unset variables fall back to the defaults in [`api`] and [`display`].
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed, or if a
    /// page size is zero.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new();

        if let Ok(url) = std::env::var("GBIF_API_BASE_URL") {
            url::Url::parse(&url).with_context(|| format!("GBIF_API_BASE_URL is not a URL: {url}"))?;
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(limit) = env_parse::<u32>("GBIF_SEARCH_LIMIT")? {
            config.search_limit = limit;
        }
        if let Some(secs) = env_parse::<u64>("GBIF_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = env_parse::<u32>("GBIF_MAX_RETRIES")? {
            config.max_retries = retries;
        }
        if let Some(secs) = env_parse::<u64>("GBIF_RETRY_DELAY_SECS")? {
            config.retry_delay = Duration::from_secs(secs);
        }
        if let Some(per_page) = env_parse::<usize>("RESULTS_PER_PAGE")? {
            config.results_per_page = per_page;
        }
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would stall pagination.
    ///
    /// # Errors
    ///
    /// Returns error if any page size or the attempt count is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.search_limit > 0, "GBIF_SEARCH_LIMIT must be greater than zero");
        anyhow::ensure!(self.max_retries > 0, "GBIF_MAX_RETRIES must be greater than zero");
        anyhow::ensure!(self.results_per_page > 0, "RESULTS_PER_PAGE must be greater than zero");
        Ok(())
    }

    /// Occurrence search endpoint.
    #[must_use]
    pub fn occurrence_search_url(&self) -> String {
        format!("{}/occurrence/search", self.api_base_url)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn env_parse<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => {
            let value = raw.trim().parse::<T>().with_context(|| format!("invalid value for {name}: {raw}"))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

//! GBIF occurrence search client.
//!
//! Provides an async HTTP client with:
//! - Offset pagination until a short page is returned
//! - Fixed-delay retry of every failed attempt
//! - Per-page progress reporting through [`ProgressSink`]

mod progress;

use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::error::{ClientError, ClientResult, FetchError, FetchResult};
use crate::models::{Occurrence, PageResponse};

pub use progress::{FetchProgress, ProgressSink};

/// GBIF occurrence search client.
#[derive(Clone)]
pub struct GbifClient {
    /// HTTP client.
    client: Client,

    /// Occurrence search endpoint.
    search_url: String,

    /// Page size, fixed for the lifetime of the client.
    limit: u32,

    /// Per-request timeout, reported in timeout errors.
    request_timeout: Duration,

    /// Attempts per page.
    max_retries: u32,

    /// Delay between attempts.
    retry_delay: Duration,
}

impl GbifClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gbif-explorer/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            search_url: config.occurrence_search_url(),
            limit: config.search_limit.max(1),
            request_timeout: config.request_timeout,
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay,
        })
    }

    /// Page size used for every request.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Fetch every occurrence recorded by `query`.
    ///
    /// Pages are requested sequentially at offsets `0, limit, 2*limit, ...`
    /// and fetching stops at the first page holding fewer than `limit`
    /// records, whatever the reported count says. `progress` is notified
    /// after each page.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::QueryInvalid`] for a blank query, or the
    /// terminal error of the first page whose retries are exhausted. Records
    /// from earlier pages are dropped in that case.
    pub async fn fetch_all<P>(&self, query: &str, progress: &mut P) -> FetchResult<Vec<Occurrence>>
    where
        P: ProgressSink + ?Sized,
    {
        let query = validate_query(query)?;
        let page_size = self.limit as usize;

        let mut all_results = Vec::new();
        let mut offset: u64 = 0;
        let mut total_count: Option<u64> = None;

        loop {
            let page = self.fetch_page(query, offset).await?;
            let received = page.results.len();
            all_results.extend(page.results);

            let total = *total_count.get_or_insert(page.count);
            progress.on_page(all_results.len(), total);

            tracing::debug!(
                query,
                offset,
                received,
                fetched = all_results.len(),
                total,
                "Fetched occurrence page"
            );

            if received < page_size {
                break;
            }

            offset += u64::from(self.limit);
        }

        tracing::info!(
            query,
            fetched = all_results.len(),
            reported = total_count.unwrap_or(0),
            "Finished fetching occurrences"
        );

        Ok(all_results)
    }

    /// Fetch a single page, retrying failed attempts.
    ///
    /// Every failure is retried: timeouts, transport errors, non-success
    /// statuses and undecodable bodies alike. Attempts are separated by a
    /// fixed delay.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RequestTimeout`] if the last attempt timed out,
    /// [`FetchError::TransportFailure`] for any other last failure.
    pub async fn fetch_page(&self, query: &str, offset: u64) -> FetchResult<PageResponse> {
        let query = validate_query(query)?;
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.request_page(query, offset).await {
                Ok(page) => {
                    if attempt > 1 {
                        tracing::info!(offset, attempts = attempt, "Page fetched after retry");
                    }
                    return Ok(page);
                }
                Err(e) if attempt < self.max_retries => {
                    tracing::warn!(
                        error = %e,
                        offset,
                        attempt,
                        max_attempts = self.max_retries,
                        delay_ms = self.retry_delay.as_millis(),
                        "Page request failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        offset,
                        attempts = attempt,
                        "Page request failed after all attempts"
                    );
                    return Err(FetchError::exhausted(attempt, e));
                }
            }
        }
    }

    /// One attempt at one page.
    async fn request_page(&self, query: &str, offset: u64) -> ClientResult<PageResponse> {
        let params = [
            ("recordedBy", query.to_string()),
            ("limit", self.limit.to_string()),
            ("offset", offset.to_string()),
        ];

        let response = self
            .client
            .get(&self.search_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::status(status.as_u16(), text));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn classify(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() { ClientError::Timeout(self.request_timeout) } else { ClientError::Http(e) }
    }
}

impl std::fmt::Debug for GbifClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GbifClient")
            .field("search_url", &self.search_url)
            .field("limit", &self.limit)
            .finish()
    }
}

/// Trim a query and reject it if nothing is left.
fn validate_query(query: &str) -> FetchResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(FetchError::QueryInvalid);
    }
    Ok(query)
}

//! HTTP client for category page fetching
//!
//! Thin wrapper over `reqwest` with browser-like headers, a bounded
//! retry policy and per-request timeout. Returns page bodies as
//! strings so callers can parse HTML outside of await points
//! (`scraper::Html` is not `Send`).

use crate::infrastructure::config::MarketplaceConfig;
use crate::infrastructure::parsing::{ScrapeError, ScrapeResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// HTTP client with marketplace-appropriate defaults.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Build a client from marketplace configuration.
    pub fn new(config: &MarketplaceConfig) -> ScrapeResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        if let Ok(lang) = HeaderValue::from_str(&config.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, lang);
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ScrapeError::request_failed(&config.base_url, e))?;

        Ok(Self {
            client,
            max_retries: config.max_retries.max(1),
        })
    }

    /// Fetch a page body with retry and exponential backoff.
    ///
    /// Only transport-level failures and retryable status codes are
    /// retried; a 404 fails immediately.
    pub async fn fetch_text(&self, url: &str) -> ScrapeResult<String> {
        let mut last_error = ScrapeError::request_failed(url, "no attempts made");

        for attempt in 1..=self.max_retries {
            match self.fetch_text_once(url).await {
                Ok(body) => {
                    debug!("Fetched {} ({} bytes) on attempt {}", url, body.len(), attempt);
                    return Ok(body);
                }
                Err(e) => {
                    warn!("Attempt {}/{} failed for {}: {}", attempt, self.max_retries, url, e);
                    let retryable = e.is_retryable();
                    last_error = e;
                    if !retryable {
                        break;
                    }
                    if attempt < self.max_retries {
                        sleep(Duration::from_secs(2_u64.pow(attempt - 1))).await;
                    }
                }
            }
        }

        Err(last_error)
    }

    async fn fetch_text_once(&self, url: &str) -> ScrapeResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::request_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::http_status(status.as_u16(), url));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::request_failed(url, e))?;

        if body.is_empty() {
            return Err(ScrapeError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(body)
    }
}

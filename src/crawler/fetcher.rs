//! HTTP fetching with bounded retry
//!
//! All outbound registry traffic goes through this module: one explicitly
//! constructed client (no global sessions) and two fetch helpers that
//! classify failures and retry transient ones with exponential backoff.
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 4xx | Immediate failure |
//! | HTTP 5xx | Retry up to max-retries, doubling delay |
//! | Timeout / connection error | Retry up to max-retries, doubling delay |

use crate::config::{ScraperConfig, UserAgentConfig};
use crate::{AlmonedaError, Result};
use reqwest::Client;
use std::time::Duration;

/// Builds the HTTP client shared by every component
///
/// The user agent identifies the scraper and its operator; the timeout
/// bounds every request the client ever makes.
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout_secs: u64,
) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Bounded exponential backoff policy for transient fetch failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retry attempts after the initial request
    pub max_retries: u32,
    /// Delay before the first retry; doubles per attempt
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(500),
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Issues a GET and returns the successful response, retrying transient
/// failures per the policy
async fn fetch_response(
    client: &Client,
    url: &str,
    retry: &RetryPolicy,
) -> Result<reqwest::Response> {
    let mut attempt = 0;
    loop {
        let error = match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }
                AlmonedaError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                }
            }
            Err(e) if e.is_timeout() => AlmonedaError::Timeout {
                url: url.to_string(),
            },
            Err(e) => AlmonedaError::Http {
                url: url.to_string(),
                message: e.to_string(),
            },
        };

        if attempt >= retry.max_retries || !error.is_transient() {
            return Err(error);
        }

        let delay = retry.delay_for(attempt);
        tracing::debug!("Retrying {} after {:?} ({})", url, delay, error);
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Fetches a URL and returns its body as text
pub async fn fetch_html(client: &Client, url: &str, retry: &RetryPolicy) -> Result<String> {
    let response = fetch_response(client, url, retry).await?;
    response.text().await.map_err(|e| AlmonedaError::Http {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Fetches a URL and returns its body as raw bytes (attachment downloads)
pub async fn fetch_bytes(client: &Client, url: &str, retry: &RetryPolicy) -> Result<Vec<u8>> {
    let response = fetch_response(client, url, retry).await?;
    let bytes = response.bytes().await.map_err(|e| AlmonedaError::Http {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    Ok(bytes.to_vec())
}

//! Scrape coordinator - main orchestration logic
//!
//! One logical worker walks the entire facet space in enumeration order.
//! Per facet: one search, then for each discovered detail URL extract,
//! geocode, persist the auction row, harvest its attachments and append
//! their rows - in strict sequence, paced by two injected rate limiters.
//! Every failure is isolated to its smallest unit and counted; only the
//! initial client and store construction can abort a run.

use crate::blob::{BlobStore, HttpBlobStore};
use crate::config::Config;
use crate::crawler::detail::extract_auction;
use crate::crawler::fetcher::{build_http_client, fetch_html, RetryPolicy};
use crate::crawler::harvest::harvest_attachments;
use crate::crawler::limiter::RateLimiter;
use crate::crawler::search::search_facet;
use crate::facets::{facet_space, facet_space_size, Facet};
use crate::geocode::Geocoder;
use crate::storage::{RunCounters, RunStatus, SqliteStorage, Storage};
use crate::{AlmonedaError, Result};
use reqwest::Client;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Cloneable cancellation signal, checked between facets and between
/// detail URLs
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Main scrape coordinator
///
/// Owns every external client explicitly; components receive them as
/// parameters, never through globals. Concurrent runs are not supported -
/// callers must serialize.
pub struct Coordinator {
    base_url: Url,
    client: Client,
    geocoder: Geocoder,
    blob: Box<dyn BlobStore>,
    storage: SqliteStorage,
    search_limiter: RateLimiter,
    detail_limiter: RateLimiter,
    retry: RetryPolicy,
    cancel: CancelToken,
    run_id: i64,
    counters: RunCounters,
}

impl Coordinator {
    /// Creates a new coordinator and registers a run row
    ///
    /// Failure to construct the HTTP client or open the store is the one
    /// fatal condition of the pipeline.
    pub fn new(config: &Config, config_hash: &str) -> Result<Self> {
        let base_url = Url::parse(&config.registry.base_url)?;
        let client = build_http_client(&config.user_agent, config.scraper.request_timeout_secs)?;
        let geocoder = Geocoder::new(client.clone(), &config.geocoder);
        let blob: Box<dyn BlobStore> =
            Box::new(HttpBlobStore::new(client.clone(), &config.blob));

        let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        let run_id = storage.create_run(config_hash)?;

        Ok(Self {
            base_url,
            client,
            geocoder,
            blob,
            storage,
            search_limiter: RateLimiter::from_millis(config.scraper.search_delay_ms),
            detail_limiter: RateLimiter::from_millis(config.scraper.detail_delay_ms),
            retry: RetryPolicy::from_config(&config.scraper),
            cancel: CancelToken::new(),
            run_id,
            counters: RunCounters::default(),
        })
    }

    /// Returns a handle callers can use to stop the run between units of
    /// work
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Runs the full scrape: every facet, every discovered detail URL
    pub async fn run(&mut self) -> Result<RunCounters> {
        tracing::info!(
            "Starting scrape run {} over {} facets against {}",
            self.run_id,
            facet_space_size(),
            self.base_url
        );
        self.run_facets(facet_space()).await
    }

    /// Runs the scrape over an explicit facet sequence
    ///
    /// [`run`](Self::run) delegates here with the full facet space; callers
    /// can pass a subset to rescrape a slice of the registry.
    pub async fn run_facets<I>(&mut self, facets: I) -> Result<RunCounters>
    where
        I: IntoIterator<Item = Facet>,
    {
        let started = std::time::Instant::now();
        let mut cancelled = false;

        'facets: for facet in facets {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            self.search_limiter.wait().await;
            self.counters.facets_searched += 1;

            let urls = match search_facet(&self.client, &self.base_url, &facet, &self.retry).await
            {
                Ok(urls) => urls,
                Err(e) => {
                    tracing::warn!("Search failed for facet [{}]: {}", facet, e);
                    self.counters.searches_failed += 1;
                    continue;
                }
            };

            if !urls.is_empty() {
                tracing::info!("Facet [{}]: {} detail pages", facet, urls.len());
            }
            self.counters.urls_discovered += urls.len() as u64;

            for url in urls {
                if self.cancel.is_cancelled() {
                    cancelled = true;
                    break 'facets;
                }

                self.detail_limiter.wait().await;
                self.process_detail_url(&url, &facet).await;
            }
        }

        let status = if cancelled {
            tracing::warn!("Run {} cancelled before completing the facet space", self.run_id);
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };
        self.storage.finish_run(self.run_id, status, &self.counters)?;

        tracing::info!(
            "Run {} finished in {:?}: {} facets searched ({} failed), {} pages attempted, \
             {} auctions persisted, {} discarded, {} failed, {} attachments stored ({} failed)",
            self.run_id,
            started.elapsed(),
            self.counters.facets_searched,
            self.counters.searches_failed,
            self.counters.pages_attempted,
            self.counters.auctions_persisted,
            self.counters.pages_discarded,
            self.counters.pages_failed,
            self.counters.attachments_stored,
            self.counters.attachment_failures,
        );

        Ok(self.counters)
    }

    /// Processes one detail URL: extract, geocode, persist, harvest
    ///
    /// Every failure here is scoped to this URL and recorded in the run
    /// counters.
    async fn process_detail_url(&mut self, url: &str, facet: &Facet) {
        self.counters.pages_attempted += 1;

        let parsed_url = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!("Unparsable detail URL {} (facet [{}]): {}", url, facet, e);
                self.counters.pages_failed += 1;
                return;
            }
        };

        let html = match fetch_html(&self.client, url, &self.retry).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Fetch failed for {} (facet [{}]): {}", url, facet, e);
                self.counters.pages_failed += 1;
                return;
            }
        };

        let auction = match extract_auction(&html, &parsed_url, &self.geocoder).await {
            Ok(auction) => auction,
            Err(AlmonedaError::Parse { message, .. }) => {
                tracing::debug!("Discarding {}: {}", url, message);
                self.counters.pages_discarded += 1;
                return;
            }
            Err(e) => {
                tracing::warn!("Extraction failed for {}: {}", url, e);
                self.counters.pages_failed += 1;
                return;
            }
        };

        if auction.coordinates.is_some() {
            self.counters.geocoded += 1;
        }

        // The auction row must exist before attachment rows reference it.
        match self.storage.upsert_auction(&auction) {
            Ok(outcome) => {
                tracing::debug!("{:?} auction {}", outcome, auction.id);
                self.counters.auctions_persisted += 1;
            }
            Err(e) => {
                tracing::warn!("Persist failed for auction {} ({}): {}", auction.id, url, e);
                self.counters.pages_failed += 1;
                return;
            }
        }

        let harvest = harvest_attachments(
            &self.client,
            self.blob.as_ref(),
            &html,
            &auction.id,
            &self.base_url,
            &self.retry,
        )
        .await;
        self.counters.attachment_failures += harvest.failures as u64;

        for attachment in harvest.images.iter().chain(harvest.documents.iter()) {
            match self.storage.insert_attachment(attachment) {
                Ok(_) => self.counters.attachments_stored += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to record attachment {} for auction {}: {}",
                        attachment.name,
                        auction.id,
                        e
                    );
                    self.counters.attachment_failures += 1;
                }
            }
        }
    }
}

/// Runs one complete scrape with a fresh coordinator
pub async fn run_scrape(config: &Config, config_hash: &str) -> Result<RunCounters> {
    let mut coordinator = Coordinator::new(config, config_hash)?;
    coordinator.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_roundtrip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    // Full-loop behavior is covered by the wiremock integration tests.
}

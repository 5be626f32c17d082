//! Crawler module: search, extraction, harvesting, orchestration
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with bounded retry
//! - Facet search and detail-link discovery
//! - Detail-page extraction and attachment harvesting
//! - Politeness pacing and overall run coordination

mod coordinator;
mod detail;
mod fetcher;
mod harvest;
mod limiter;
mod search;

pub use coordinator::{run_scrape, CancelToken, Coordinator};
pub use detail::{auction_id_from_url, extract_auction, full_address, parse_detail};
pub use fetcher::{build_http_client, fetch_bytes, fetch_html, RetryPolicy};
pub use harvest::{harvest_attachments, HarvestOutcome};
pub use limiter::RateLimiter;
pub use search::{build_search_url, extract_detail_urls, search_facet, DETAIL_PATH, SEARCH_PATH};

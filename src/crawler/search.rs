//! Facet search against the registry's advanced-search surface
//!
//! One GET per facet, encoding the four filter values as the registry's
//! `campo[i]`/`dato[i]` parameter pairs. The response body is scanned for
//! anchors pointing at detail pages; relative hrefs resolve against the
//! registry base and duplicates collapse to their first occurrence.

use crate::crawler::fetcher::{fetch_html, RetryPolicy};
use crate::facets::Facet;
use crate::Result;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Path of the advanced-search endpoint, relative to the registry base
pub const SEARCH_PATH: &str = "subastas_ava.php";

/// Path fragment identifying a detail-page link
pub const DETAIL_PATH: &str = "detalleSubasta.php";

/// Builds the search URL for one facet
pub fn build_search_url(base: &Url, facet: &Facet) -> Result<Url> {
    let mut url = base.join(SEARCH_PATH)?;
    url.query_pairs_mut()
        .append_pair("campo[0]", "PROVINCIA")
        .append_pair("dato[0]", facet.province)
        .append_pair("campo[1]", "TIPO_BIEN")
        .append_pair("dato[1]", facet.asset_type)
        .append_pair("campo[2]", "TIPO_SUBASTA")
        .append_pair("dato[2]", facet.auction_type)
        .append_pair("campo[3]", "ESTADO")
        .append_pair("dato[3]", facet.status);
    Ok(url)
}

/// Extracts detail-page URLs from a search result page
///
/// Returns unique absolute URLs in first-occurrence order. Anchors whose
/// href does not contain the detail path, and hrefs that fail to resolve
/// against the base, are skipped.
pub fn extract_detail_urls(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !href.contains(DETAIL_PATH) {
                continue;
            }
            if let Ok(resolved) = base.join(href.trim()) {
                let resolved = resolved.to_string();
                if seen.insert(resolved.clone()) {
                    urls.push(resolved);
                }
            }
        }
    }

    urls
}

/// Runs one facet search and returns the discovered detail URLs
///
/// Network errors and non-2xx responses propagate to the caller, which
/// treats them as a skipped facet - never as a fatal condition.
pub async fn search_facet(
    client: &Client,
    base: &Url,
    facet: &Facet,
    retry: &RetryPolicy,
) -> Result<Vec<String>> {
    let url = build_search_url(base, facet)?;
    let html = fetch_html(client, url.as_str(), retry).await?;
    Ok(extract_detail_urls(&html, base))
}

//! Detail-page extraction
//!
//! A detail page carries one primary heading and an arbitrary number of
//! two-column table rows - the registry's only structured-data surface.
//! Extraction walks every row, matching the left cell against the ordered
//! field-rule table; the auction id comes from the page URL's `idSub`
//! parameter and is the one thing that can make a page unusable.

use crate::geocode::Geocoder;
use crate::model::Auction;
use crate::parse::{apply_field_rules, clean_text};
use crate::{AlmonedaError, Result};
use scraper::{Html, Selector};
use url::Url;

/// Extracts the auction id from a detail URL's `idSub` query parameter
pub fn auction_id_from_url(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "idSub")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Parses a detail page into an [`Auction`]
///
/// Pure function of the page content and its URL; geocoding happens in
/// [`extract_auction`]. A missing auction id yields a parse error that the
/// orchestrator treats as a discarded page, not a failure.
pub fn parse_detail(html: &str, url: &Url) -> Result<Auction> {
    let id = auction_id_from_url(url).ok_or_else(|| AlmonedaError::Parse {
        url: url.to_string(),
        message: "missing idSub query parameter".to_string(),
    })?;

    let document = Html::parse_document(html);
    let mut auction = Auction {
        id,
        source_url: url.to_string(),
        ..Default::default()
    };

    if let Ok(heading) = Selector::parse("h1") {
        if let Some(element) = document.select(&heading).next() {
            auction.title = clean_text(&element.text().collect::<String>());
        }
    }

    if let (Ok(rows), Ok(cells)) = (Selector::parse("tr"), Selector::parse("td, th")) {
        for row in document.select(&rows) {
            let row_cells: Vec<_> = row.select(&cells).collect();
            if row_cells.len() < 2 {
                continue;
            }
            let label = clean_text(&row_cells[0].text().collect::<String>());
            let value = clean_text(&row_cells[1].text().collect::<String>());
            apply_field_rules(&mut auction, &label, &value);
        }
    }

    // A closing date before the opening date is provably wrong; keep the
    // start and drop the end rather than fail the record.
    if let (Some(start), Some(end)) = (auction.start_date, auction.end_date) {
        if start > end {
            tracing::warn!(
                "Auction {}: end date {} precedes start date {}, discarding end date",
                auction.id,
                end,
                start
            );
            auction.end_date = None;
        }
    }

    Ok(auction)
}

/// Assembles the free-text geocoding query for an auction's location
pub fn full_address(auction: &Auction) -> String {
    format!(
        "{}, {}, {}, España",
        auction.address, auction.locality, auction.province
    )
}

/// Parses a detail page and resolves its address to coordinates
///
/// The geocoder is only consulted when an address was extracted; absent
/// coordinates are never an error.
pub async fn extract_auction(html: &str, url: &Url, geocoder: &Geocoder) -> Result<Auction> {
    let mut auction = parse_detail(html, url)?;

    if !auction.address.is_empty() {
        auction.coordinates = geocoder.resolve(&full_address(&auction)).await;
    }

    Ok(auction)
}

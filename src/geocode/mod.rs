//! Fail-soft address geocoding
//!
//! One free-text lookup per extracted address against a Nominatim-compatible
//! endpoint, bounded by its own short timeout and consuming only the first
//! match. The contract is absolute: nothing that happens here - timeout, no
//! match, malformed response - ever propagates past this boundary. A failed
//! lookup is simply "no coordinates".

use crate::config::GeocoderConfig;
use crate::model::Coordinates;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Geocoding client borrowing the orchestrator's HTTP client
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

/// One element of the service's JSON array response
///
/// Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: String,
    lon: String,
}

impl Geocoder {
    pub fn new(client: Client, config: &GeocoderConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Resolves a free-text address to coordinates
    ///
    /// Returns None on any failure whatsoever.
    pub async fn resolve(&self, query: &str) -> Option<Coordinates> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| tracing::debug!("Geocode request failed for '{}': {}", query, e))
            .ok()?;

        if !response.status().is_success() {
            tracing::debug!(
                "Geocode lookup for '{}' returned HTTP {}",
                query,
                response.status()
            );
            return None;
        }

        let hits: Vec<GeocodeHit> = response
            .json()
            .await
            .map_err(|e| tracing::debug!("Geocode response for '{}' unreadable: {}", query, e))
            .ok()?;

        let hit = hits.first()?;
        let latitude = hit.lat.parse().ok()?;
        let longitude = hit.lon.parse().ok()?;

        Some(Coordinates {
            latitude,
            longitude,
        })
    }
}

// Lookup behavior against live responses is covered by the wiremock
// integration tests; the swallow-everything contract has no other surface.

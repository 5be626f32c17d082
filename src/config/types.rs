use serde::Deserialize;

/// Main configuration structure for Almoneda
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub registry: RegistryConfig,
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub geocoder: GeocoderConfig,
    pub blob: BlobConfig,
    pub output: OutputConfig,
}

/// Upstream registry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the auction registry (search and detail paths resolve
    /// against it)
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Scraper behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Politeness delay between successive facet searches (milliseconds)
    #[serde(rename = "search-delay-ms")]
    pub search_delay_ms: u64,

    /// Politeness delay between successive detail-page fetches (milliseconds)
    #[serde(rename = "detail-delay-ms")]
    pub detail_delay_ms: u64,

    /// Timeout applied to every outbound request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Maximum retry attempts for transient fetch failures
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the scraper
    #[serde(rename = "scraper-name")]
    pub scraper_name: String,

    /// Version of the scraper
    #[serde(rename = "scraper-version")]
    pub scraper_version: String,

    /// URL with information about the scraper
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for scraper-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value sent with every request
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.scraper_name, self.scraper_version, self.contact_url, self.contact_email
        )
    }
}

/// Geocoding service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    /// Search endpoint of a Nominatim-compatible geocoding service
    pub endpoint: String,

    /// Timeout for a single lookup (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

/// Blob storage configuration (S3-style object store)
#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    /// Object store endpoint, e.g. "https://s3.eu-west-3.amazonaws.com"
    pub endpoint: String,

    /// Bucket name for harvested attachments
    pub bucket: String,

    /// Base URL under which uploaded objects are publicly readable.
    /// Defaults to "{endpoint}/{bucket}" when absent.
    #[serde(rename = "public-base-url")]
    pub public_base_url: Option<String>,
}

impl BlobConfig {
    /// Returns the public base URL objects are served from
    pub fn public_base(&self) -> String {
        match &self.public_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!(
                "{}/{}",
                self.endpoint.trim_end_matches('/'),
                self.bucket
            ),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

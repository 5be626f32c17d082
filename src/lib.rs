//! Almoneda: an auction registry ingestion pipeline
//!
//! This crate crawls a public auction registry: it enumerates a combinatorial
//! facet search space, discovers listing detail pages, extracts structured
//! auction records from loosely-formatted HTML, geocodes addresses, harvests
//! attached images and documents into blob storage, and idempotently persists
//! everything into a relational store.

pub mod blob;
pub mod config;
pub mod crawler;
pub mod facets;
pub mod geocode;
pub mod model;
pub mod output;
pub mod parse;
pub mod storage;

use thiserror::Error;

/// Main error type for Almoneda operations
#[derive(Debug, Error)]
pub enum AlmonedaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {message}")]
    Http { url: String, message: String },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Geocoder unavailable: {0}")]
    Geocode(String),

    #[error("Blob upload failed for {key}: {message}")]
    BlobUpload { key: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AlmonedaError {
    /// Returns true if retrying the same request may succeed
    ///
    /// Timeouts, connection failures and 5xx responses are transient;
    /// 4xx responses and parse errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Http { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Almoneda operations
pub type Result<T> = std::result::Result<T, AlmonedaError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use facets::{facet_space, facet_space_size, Facet};
pub use model::{Attachment, AttachmentKind, Auction, Coordinates};

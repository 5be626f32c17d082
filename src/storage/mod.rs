//! Storage layer: idempotent persistence for auctions and attachments
//!
//! The gateway upserts auction rows keyed by the registry's external id
//! (mutable fields only on conflict), appends attachment rows, and keeps a
//! durable record of every scrape run and its final counters.

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::model::Auction;

/// Status of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Counters aggregated by the orchestrator over one run
///
/// Persisted on the run row at completion so failures stay queryable after
/// the process exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCounters {
    pub facets_searched: u64,
    pub searches_failed: u64,
    pub urls_discovered: u64,
    pub pages_attempted: u64,
    pub auctions_persisted: u64,
    pub pages_discarded: u64,
    pub pages_failed: u64,
    pub attachments_stored: u64,
    pub attachment_failures: u64,
    pub geocoded: u64,
}

/// A stored scrape run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub counters: RunCounters,
}

/// A stored auction row with its gateway-managed timestamps
#[derive(Debug, Clone)]
pub struct AuctionRecord {
    pub auction: Auction,
    pub first_seen_at: String,
    pub last_updated_at: String,
}

/// A stored attachment row
#[derive(Debug, Clone)]
pub struct AttachmentRecord {
    pub id: i64,
    pub auction_id: String,
    pub name: String,
    pub source_url: String,
    pub storage_url: String,
    pub size_bytes: u64,
    pub downloaded_at: String,
}

/// Whether an upsert created a new row or refreshed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

//! Storage traits and error types

use crate::model::{Attachment, AttachmentKind, Auction};
use crate::storage::{AttachmentRecord, AuctionRecord, RunCounters, RunRecord, RunStatus, UpsertOutcome};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every write commits or fails independently at row level; one failing
/// row never rolls back others written in the same run.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new scrape run in Running state, returning its id
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Finalizes a run with its terminal status and counter snapshot
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counters: &RunCounters,
    ) -> StorageResult<()>;

    /// Gets a run by id
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Auctions =====

    /// Inserts a new auction or, on id conflict, updates only the mutable
    /// subset (title, description, status) and advances last_updated_at;
    /// first_seen_at is never touched after insert
    fn upsert_auction(&mut self, auction: &Auction) -> StorageResult<UpsertOutcome>;

    /// Gets an auction row by external id
    fn get_auction(&self, id: &str) -> StorageResult<Option<AuctionRecord>>;

    /// Total number of stored auctions
    fn count_auctions(&self) -> StorageResult<u64>;

    // ===== Attachments =====

    /// Appends one attachment row (images or documents table per kind),
    /// returning the new row id
    fn insert_attachment(&mut self, attachment: &Attachment) -> StorageResult<i64>;

    /// Gets all attachments of one kind for an auction
    fn get_attachments(
        &self,
        auction_id: &str,
        kind: AttachmentKind,
    ) -> StorageResult<Vec<AttachmentRecord>>;

    /// Total number of stored attachments of one kind
    fn count_attachments(&self, kind: AttachmentKind) -> StorageResult<u64>;

    // ===== Statistics =====

    /// Auction counts per province, most populous first
    fn count_auctions_by_province(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Auction counts per status, most populous first
    fn count_auctions_by_status(&self) -> StorageResult<Vec<(String, u64)>>;
}

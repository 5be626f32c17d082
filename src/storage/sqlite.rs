//! SQLite storage implementation

use crate::model::{Attachment, AttachmentKind, Auction, Coordinates};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{AttachmentRecord, AuctionRecord, RunCounters, RunRecord, RunStatus, UpsertOutcome};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at the given path
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn attachment_table(kind: AttachmentKind) -> &'static str {
        match kind {
            AttachmentKind::Image => "images",
            AttachmentKind::Document => "documents",
        }
    }
}

fn map_run_row(row: &Row) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        counters: RunCounters {
            facets_searched: row.get::<_, i64>(5)? as u64,
            searches_failed: row.get::<_, i64>(6)? as u64,
            urls_discovered: row.get::<_, i64>(7)? as u64,
            pages_attempted: row.get::<_, i64>(8)? as u64,
            auctions_persisted: row.get::<_, i64>(9)? as u64,
            pages_discarded: row.get::<_, i64>(10)? as u64,
            pages_failed: row.get::<_, i64>(11)? as u64,
            attachments_stored: row.get::<_, i64>(12)? as u64,
            attachment_failures: row.get::<_, i64>(13)? as u64,
            geocoded: row.get::<_, i64>(14)? as u64,
        },
    })
}

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, \
    facets_searched, searches_failed, urls_discovered, pages_attempted, \
    auctions_persisted, pages_discarded, pages_failed, attachments_stored, \
    attachment_failures, geocoded";

const AUCTION_COLUMNS: &str = "id, title, description, asset_type, auction_type, status, \
    lot_description, province, locality, address, latitude, longitude, \
    cadastral_reference, vehicle_brand, vehicle_model, vehicle_plate, \
    claimed_amount, appraisal_value, auction_value, bid_increment, min_bid, \
    max_bid, deposit_amount, creditor_name, start_date, end_date, source_url, \
    first_seen_at, last_updated_at";

fn parse_stored_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

fn map_auction_row(row: &Row) -> rusqlite::Result<AuctionRecord> {
    let latitude: Option<f64> = row.get(10)?;
    let longitude: Option<f64> = row.get(11)?;
    let coordinates = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    Ok(AuctionRecord {
        auction: Auction {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            asset_type: row.get(3)?,
            auction_type: row.get(4)?,
            status: row.get(5)?,
            lot_description: row.get(6)?,
            province: row.get(7)?,
            locality: row.get(8)?,
            address: row.get(9)?,
            coordinates,
            cadastral_reference: row.get(12)?,
            vehicle_brand: row.get(13)?,
            vehicle_model: row.get(14)?,
            vehicle_plate: row.get(15)?,
            claimed_amount: row.get(16)?,
            appraisal_value: row.get(17)?,
            auction_value: row.get(18)?,
            bid_increment: row.get(19)?,
            min_bid: row.get(20)?,
            max_bid: row.get(21)?,
            deposit_amount: row.get(22)?,
            creditor_name: row.get(23)?,
            start_date: parse_stored_date(row.get(24)?),
            end_date: parse_stored_date(row.get(25)?),
            source_url: row.get(26)?,
        },
        first_seen_at: row.get(27)?,
        last_updated_at: row.get(28)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counters: &RunCounters,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2,
             facets_searched = ?3, searches_failed = ?4, urls_discovered = ?5,
             pages_attempted = ?6, auctions_persisted = ?7, pages_discarded = ?8,
             pages_failed = ?9, attachments_stored = ?10, attachment_failures = ?11,
             geocoded = ?12
             WHERE id = ?13",
            params![
                status.to_db_string(),
                now,
                counters.facets_searched as i64,
                counters.searches_failed as i64,
                counters.urls_discovered as i64,
                counters.pages_attempted as i64,
                counters.auctions_persisted as i64,
                counters.pages_discarded as i64,
                counters.pages_failed as i64,
                counters.attachments_stored as i64,
                counters.attachment_failures as i64,
                counters.geocoded as i64,
                run_id
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS))?;

        stmt.query_row(params![run_id], map_run_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM runs ORDER BY id DESC LIMIT 1",
            RUN_COLUMNS
        ))?;

        Ok(stmt.query_row([], map_run_row).optional()?)
    }

    // ===== Auctions =====

    fn upsert_auction(&mut self, auction: &Auction) -> StorageResult<UpsertOutcome> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM auctions WHERE id = ?1",
                params![auction.id],
                |row| row.get(0),
            )
            .optional()?;

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            &format!(
                "INSERT INTO auctions ({}) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                    ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26,
                    ?27, ?28, ?29
                )
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    status = excluded.status,
                    last_updated_at = excluded.last_updated_at",
                AUCTION_COLUMNS
            ),
            params![
                auction.id,
                auction.title,
                auction.description,
                auction.asset_type,
                auction.auction_type,
                auction.status,
                auction.lot_description,
                auction.province,
                auction.locality,
                auction.address,
                auction.coordinates.map(|c| c.latitude),
                auction.coordinates.map(|c| c.longitude),
                auction.cadastral_reference,
                auction.vehicle_brand,
                auction.vehicle_model,
                auction.vehicle_plate,
                auction.claimed_amount,
                auction.appraisal_value,
                auction.auction_value,
                auction.bid_increment,
                auction.min_bid,
                auction.max_bid,
                auction.deposit_amount,
                auction.creditor_name,
                auction.start_date.map(|d| d.to_string()),
                auction.end_date.map(|d| d.to_string()),
                auction.source_url,
                now,
                now
            ],
        )?;

        Ok(if existing.is_some() {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Inserted
        })
    }

    fn get_auction(&self, id: &str) -> StorageResult<Option<AuctionRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM auctions WHERE id = ?1",
            AUCTION_COLUMNS
        ))?;

        Ok(stmt.query_row(params![id], map_auction_row).optional()?)
    }

    fn count_auctions(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM auctions", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Attachments =====

    fn insert_attachment(&mut self, attachment: &Attachment) -> StorageResult<i64> {
        let table = Self::attachment_table(attachment.kind);
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            &format!(
                "INSERT INTO {} (auction_id, name, source_url, storage_url, size_bytes, downloaded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                table
            ),
            params![
                attachment.auction_id,
                attachment.name,
                attachment.source_url,
                attachment.storage_url,
                attachment.size_bytes as i64,
                now
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_attachments(
        &self,
        auction_id: &str,
        kind: AttachmentKind,
    ) -> StorageResult<Vec<AttachmentRecord>> {
        let table = Self::attachment_table(kind);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, auction_id, name, source_url, storage_url, size_bytes, downloaded_at
             FROM {} WHERE auction_id = ?1 ORDER BY id",
            table
        ))?;

        let records = stmt
            .query_map(params![auction_id], |row| {
                Ok(AttachmentRecord {
                    id: row.get(0)?,
                    auction_id: row.get(1)?,
                    name: row.get(2)?,
                    source_url: row.get(3)?,
                    storage_url: row.get(4)?,
                    size_bytes: row.get::<_, i64>(5)? as u64,
                    downloaded_at: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn count_attachments(&self, kind: AttachmentKind) -> StorageResult<u64> {
        let table = Self::attachment_table(kind);
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count as u64)
    }

    // ===== Statistics =====

    fn count_auctions_by_province(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT province, COUNT(*) FROM auctions GROUP BY province ORDER BY COUNT(*) DESC",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn count_auctions_by_status(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM auctions GROUP BY status ORDER BY COUNT(*) DESC",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

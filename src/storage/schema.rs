//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Almoneda
//! database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track scrape runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    facets_searched INTEGER NOT NULL DEFAULT 0,
    searches_failed INTEGER NOT NULL DEFAULT 0,
    urls_discovered INTEGER NOT NULL DEFAULT 0,
    pages_attempted INTEGER NOT NULL DEFAULT 0,
    auctions_persisted INTEGER NOT NULL DEFAULT 0,
    pages_discarded INTEGER NOT NULL DEFAULT 0,
    pages_failed INTEGER NOT NULL DEFAULT 0,
    attachments_stored INTEGER NOT NULL DEFAULT 0,
    attachment_failures INTEGER NOT NULL DEFAULT 0,
    geocoded INTEGER NOT NULL DEFAULT 0
);

-- One row per auction listing, keyed by the registry's external id
CREATE TABLE IF NOT EXISTS auctions (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    asset_type TEXT NOT NULL DEFAULT '',
    auction_type TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT '',
    lot_description TEXT NOT NULL DEFAULT '',
    province TEXT NOT NULL DEFAULT '',
    locality TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL DEFAULT '',
    latitude REAL,
    longitude REAL,
    cadastral_reference TEXT,
    vehicle_brand TEXT,
    vehicle_model TEXT,
    vehicle_plate TEXT,
    claimed_amount REAL NOT NULL DEFAULT 0,
    appraisal_value REAL NOT NULL DEFAULT 0,
    auction_value REAL NOT NULL DEFAULT 0,
    bid_increment REAL NOT NULL DEFAULT 0,
    min_bid REAL NOT NULL DEFAULT 0,
    max_bid REAL NOT NULL DEFAULT 0,
    deposit_amount REAL NOT NULL DEFAULT 0,
    creditor_name TEXT NOT NULL DEFAULT '',
    start_date TEXT,
    end_date TEXT,
    source_url TEXT NOT NULL,
    first_seen_at TEXT NOT NULL,
    last_updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_auctions_province ON auctions(province);
CREATE INDEX IF NOT EXISTS idx_auctions_asset_type ON auctions(asset_type);
CREATE INDEX IF NOT EXISTS idx_auctions_status ON auctions(status);
CREATE INDEX IF NOT EXISTS idx_auctions_start_date ON auctions(start_date);

-- Harvested gallery images
CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    auction_id TEXT NOT NULL REFERENCES auctions(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    source_url TEXT NOT NULL,
    storage_url TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    downloaded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_images_auction ON images(auction_id);

-- Harvested documents
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    auction_id TEXT NOT NULL REFERENCES auctions(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    source_url TEXT NOT NULL,
    storage_url TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    downloaded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_auction ON documents(auction_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

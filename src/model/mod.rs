//! Domain models for extracted auction data

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A resolved geographic position
///
/// Coordinates are always present as a pair or absent entirely; an
/// `Option<Coordinates>` on [`Auction`] encodes that invariant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One auction listing extracted from a registry detail page
///
/// The `id` is the registry's external identifier and is stable across
/// re-scrapes; it keys the persisted row. Monetary fields are non-negative
/// by construction of the numeric parser. Creation/update timestamps are
/// managed by the persistence gateway, not carried here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Auction {
    pub id: String,
    pub title: String,
    pub description: String,
    pub asset_type: String,
    pub auction_type: String,
    pub status: String,
    pub lot_description: String,
    pub province: String,
    pub locality: String,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub cadastral_reference: Option<String>,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_plate: Option<String>,
    pub claimed_amount: f64,
    pub appraisal_value: f64,
    pub auction_value: f64,
    pub bid_increment: f64,
    pub min_bid: f64,
    pub max_bid: f64,
    pub deposit_amount: f64,
    pub creditor_name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub source_url: String,
}

/// Attachment variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentKind {
    Image,
    Document,
}

/// A harvested attachment relocated into blob storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    /// External id of the owning auction
    pub auction_id: String,
    /// Display name, also the last segment of the storage key
    pub name: String,
    /// Where the attachment was downloaded from
    pub source_url: String,
    /// Public URL of the stored copy
    pub storage_url: String,
    pub size_bytes: u64,
}

//! Statistics generation from the scrape database
//!
//! This module extracts and displays store-level statistics for the
//! `--stats` CLI mode.

use crate::model::AttachmentKind;
use crate::storage::{RunRecord, Storage};
use crate::Result;

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct ScrapeStatistics {
    /// Total number of stored auctions
    pub total_auctions: u64,

    /// Total number of harvested images
    pub total_images: u64,

    /// Total number of harvested documents
    pub total_documents: u64,

    /// Auction counts per province, most populous first
    pub by_province: Vec<(String, u64)>,

    /// Auction counts per status, most populous first
    pub by_status: Vec<(String, u64)>,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<ScrapeStatistics> {
    Ok(ScrapeStatistics {
        total_auctions: storage.count_auctions()?,
        total_images: storage.count_attachments(AttachmentKind::Image)?,
        total_documents: storage.count_attachments(AttachmentKind::Document)?,
        by_province: storage.count_auctions_by_province()?,
        by_status: storage.count_auctions_by_status()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ScrapeStatistics) {
    println!("=== Scrape Statistics ===\n");

    println!("Overview:");
    println!("  Auctions: {}", stats.total_auctions);
    println!("  Images: {}", stats.total_images);
    println!("  Documents: {}", stats.total_documents);
    println!();

    if !stats.by_status.is_empty() {
        println!("Auctions by Status:");
        for (status, count) in &stats.by_status {
            println!("  {}: {}", status, count);
        }
        println!();
    }

    if !stats.by_province.is_empty() {
        println!("Auctions by Province:");
        for (province, count) in &stats.by_province {
            println!("  {}: {}", province, count);
        }
        println!();
    }

    if let Some(run) = &stats.latest_run {
        println!("Latest Run (#{}):", run.id);
        println!("  Status: {}", run.status.to_db_string());
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!(
            "  Facets searched: {} ({} failed)",
            run.counters.facets_searched, run.counters.searches_failed
        );
        println!(
            "  Pages: {} attempted, {} persisted, {} discarded, {} failed",
            run.counters.pages_attempted,
            run.counters.auctions_persisted,
            run.counters.pages_discarded,
            run.counters.pages_failed
        );
        println!(
            "  Attachments: {} stored ({} failed)",
            run.counters.attachments_stored, run.counters.attachment_failures
        );
        println!("  Geocoded: {}", run.counters.geocoded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attachment, Auction};
    use crate::storage::{SqliteStorage, Storage};

    #[test]
    fn test_load_statistics_from_populated_store() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        let auction = Auction {
            id: "SUB-1".to_string(),
            province: "Madrid".to_string(),
            status: "Celebrándose".to_string(),
            source_url: "https://x/detalleSubasta.php?idSub=SUB-1".to_string(),
            ..Default::default()
        };
        storage.upsert_auction(&auction).unwrap();
        storage
            .insert_attachment(&Attachment {
                kind: AttachmentKind::Image,
                auction_id: "SUB-1".to_string(),
                name: "image_1.jpg".to_string(),
                source_url: "https://x/1.jpg".to_string(),
                storage_url: "https://cdn/1.jpg".to_string(),
                size_bytes: 10,
            })
            .unwrap();

        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.total_auctions, 1);
        assert_eq!(stats.total_images, 1);
        assert_eq!(stats.total_documents, 0);
        assert_eq!(stats.by_province[0].0, "Madrid");
        assert!(stats.latest_run.is_none());
    }
}

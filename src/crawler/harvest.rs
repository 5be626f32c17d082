//! Attachment harvesting
//!
//! A detail page advertises its media two ways: `<img>` elements whose class
//! carries a gallery marker, and anchors that look like document links (pdf
//! extension or "documento" in the href). Each candidate is downloaded and
//! re-uploaded to blob storage under a stable per-auction key. One failed
//! candidate is logged and skipped; it never aborts the rest of the harvest
//! or the owning auction.

use crate::blob::{content_type_for, BlobStore};
use crate::crawler::fetcher::{fetch_bytes, RetryPolicy};
use crate::model::{Attachment, AttachmentKind};
use crate::parse::clean_text;
use crate::Result;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// Class-attribute markers identifying gallery images
const IMAGE_MARKERS: &[&str] = &["foto", "imagen", "gallery"];

/// Maximum length of a sanitized document name, before the extension
const MAX_DOCUMENT_NAME: usize = 100;

/// Result of harvesting one detail page
#[derive(Debug, Default)]
pub struct HarvestOutcome {
    pub images: Vec<Attachment>,
    pub documents: Vec<Attachment>,
    /// Candidates that failed to download or upload
    pub failures: u32,
}

/// Collects image and document candidates from the page DOM
///
/// Returns resolved absolute URLs; document candidates carry their anchor
/// text for naming. The DOM is dropped before any network activity starts.
fn collect_candidates(html: &str, base: &Url) -> (Vec<Url>, Vec<(Url, String)>) {
    let document = Html::parse_document(html);
    let mut images = Vec::new();
    let mut documents = Vec::new();

    if let Ok(selector) = Selector::parse("img[src]") {
        for element in document.select(&selector) {
            let class_matches = element
                .value()
                .attr("class")
                .map(|class| {
                    let class = class.to_lowercase();
                    IMAGE_MARKERS.iter().any(|marker| class.contains(marker))
                })
                .unwrap_or(false);
            if !class_matches {
                continue;
            }

            let Some(src) = element.value().attr("src") else {
                continue;
            };
            if src.starts_with("data:") {
                continue;
            }
            if let Ok(resolved) = base.join(src.trim()) {
                images.push(resolved);
            }
        }
    }

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let lowered = href.to_lowercase();
            if !lowered.contains(".pdf") && !lowered.contains("documento") {
                continue;
            }
            if let Ok(resolved) = base.join(href.trim()) {
                let text = clean_text(&element.text().collect::<String>());
                documents.push((resolved, text));
            }
        }
    }

    (images, documents)
}

/// Derives the file extension from a URL path, defaulting to "jpg"
fn extension_of(url: &Url) -> String {
    url.path()
        .rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string())
}

/// Builds a storage-safe document name from anchor text
///
/// Keeps word characters, whitespace and dashes, truncates, and falls back
/// to a sequential name when nothing survives.
fn document_name(text: &str, index: usize) -> String {
    let sanitized: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .take(MAX_DOCUMENT_NAME)
        .collect();
    let sanitized = sanitized.trim();

    if sanitized.is_empty() {
        format!("document_{}.pdf", index + 1)
    } else {
        format!("{}.pdf", sanitized)
    }
}

async fn store_candidate(
    client: &Client,
    blob: &dyn BlobStore,
    retry: &RetryPolicy,
    source: &Url,
    key: &str,
    content_type: &str,
) -> Result<(String, u64)> {
    let bytes = fetch_bytes(client, source.as_str(), retry).await?;
    let size = bytes.len() as u64;
    let storage_url = blob.put_object(key, &bytes, content_type).await?;
    Ok((storage_url, size))
}

/// Harvests every image and document candidate on a detail page
///
/// Storage keys follow `auctions/{id}/images/image_{n}.{ext}` and
/// `auctions/{id}/documents/{name}.pdf`. Re-harvesting the same auction
/// re-downloads and re-uploads every candidate unconditionally.
pub async fn harvest_attachments(
    client: &Client,
    blob: &dyn BlobStore,
    html: &str,
    auction_id: &str,
    base: &Url,
    retry: &RetryPolicy,
) -> HarvestOutcome {
    let (image_urls, document_links) = collect_candidates(html, base);
    let mut outcome = HarvestOutcome::default();

    for (index, source) in image_urls.iter().enumerate() {
        let extension = extension_of(source);
        let name = format!("image_{}.{}", index + 1, extension);
        let key = format!("auctions/{}/images/{}", auction_id, name);

        match store_candidate(client, blob, retry, source, &key, content_type_for(&extension))
            .await
        {
            Ok((storage_url, size_bytes)) => outcome.images.push(Attachment {
                kind: AttachmentKind::Image,
                auction_id: auction_id.to_string(),
                name,
                source_url: source.to_string(),
                storage_url,
                size_bytes,
            }),
            Err(e) => {
                tracing::warn!("Skipping image {} for auction {}: {}", source, auction_id, e);
                outcome.failures += 1;
            }
        }
    }

    for (index, (source, text)) in document_links.iter().enumerate() {
        let name = document_name(text, index);
        let key = format!("auctions/{}/documents/{}", auction_id, name);

        match store_candidate(client, blob, retry, source, &key, "application/pdf").await {
            Ok((storage_url, size_bytes)) => outcome.documents.push(Attachment {
                kind: AttachmentKind::Document,
                auction_id: auction_id.to_string(),
                name,
                source_url: source.to_string(),
                storage_url,
                size_bytes,
            }),
            Err(e) => {
                tracing::warn!(
                    "Skipping document {} for auction {}: {}",
                    source,
                    auction_id,
                    e
                );
                outcome.failures += 1;
            }
        }
    }

    outcome
}

//! Blob storage for harvested attachments
//!
//! Attachments are relocated into an S3-style object store under stable
//! keys (`auctions/{id}/{images|documents}/{name}`), written public-read
//! with a content type inferred from the file extension. The [`BlobStore`]
//! trait is the substitution seam for tests.

use crate::config::BlobConfig;
use crate::{AlmonedaError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// Object store abstraction
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes one object and returns its public retrieval URL
    async fn put_object(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String>;
}

/// S3-style object store accessed over plain HTTP PUTs
pub struct HttpBlobStore {
    client: Client,
    endpoint: String,
    bucket: String,
    public_base: String,
}

impl HttpBlobStore {
    pub fn new(client: Client, config: &BlobConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            public_base: config.public_base(),
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put_object(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);

        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .header("x-amz-acl", "public-read")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| AlmonedaError::BlobUpload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(AlmonedaError::BlobUpload {
                key: key.to_string(),
                message: format!("HTTP {}", response.status().as_u16()),
            });
        }

        Ok(format!("{}/{}", self.public_base, key))
    }
}

/// Maps a file extension to the content type sent on upload
pub fn content_type_for(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

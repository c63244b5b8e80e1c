//! Blob storage client
//!
//! Uploaded files live in an external object store reached over HTTP. The
//! store is write-by-path and returns a publicly fetchable URL; reads are a
//! plain GET on that URL.

use crate::errors::{AppError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Trait for blob storage access
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes at a path, returning the public URL of the object.
    async fn store(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// Fetch an object by its public URL.
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// Blob store backed by an object-storage HTTP endpoint
pub struct HttpBlobStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    public_base: String,
}

impl HttpBlobStore {
    pub fn new(
        endpoint: &str,
        bucket: &str,
        public_base: &str,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            public_base: public_base.trim_end_matches('/').to_string(),
        })
    }

    fn object_url(&self, base: &str, path: &str) -> String {
        format!("{}/{}/{}", base, self.bucket, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn store(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let upload_url = self.object_url(&self.endpoint, path);

        let response = self
            .client
            .put(&upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::BlobStore {
                message: format!("Failed to upload {}: {}", path, e),
            })?;

        if !response.status().is_success() {
            return Err(AppError::BlobStore {
                message: format!("Upload of {} returned {}", path, response.status()),
            });
        }

        tracing::info!(path = path, "Stored blob");
        Ok(self.object_url(&self.public_base, path))
    }

    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::BlobStore {
                message: format!("Failed to fetch {}: {}", url, e),
            })?;

        if !response.status().is_success() {
            return Err(AppError::BlobStore {
                message: format!("Fetch of {} returned {}", url, response.status()),
            });
        }

        response.bytes().await.map_err(|e| AppError::BlobStore {
            message: format!("Failed to read body of {}: {}", url, e),
        })
    }
}

/// In-memory blob store for tests
pub struct MemoryBlobStore {
    objects: std::sync::Mutex<std::collections::HashMap<String, Bytes>>,
    public_base: String,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            objects: std::sync::Mutex::new(std::collections::HashMap::new()),
            public_base: "memory://papers".to_string(),
        }
    }

    /// Seed an object directly under a URL.
    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Bytes>) {
        self.objects.lock().unwrap().insert(url.into(), bytes.into());
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        let url = format!("{}/{}", self.public_base, path.trim_start_matches('/'));
        self.objects
            .lock()
            .unwrap()
            .insert(url.clone(), Bytes::from(bytes));
        Ok(url)
    }

    async fn fetch(&self, url: &str) -> Result<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::BlobStore {
                message: format!("Fetch of {} returned 404 Not Found", url),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_joins_segments() {
        let store = HttpBlobStore::new(
            "http://localhost:9000/",
            "papers",
            "https://cdn.example.com",
            30,
        )
        .unwrap();

        assert_eq!(
            store.object_url(&store.endpoint, "papers/CS201_2023-24_17.pdf"),
            "http://localhost:9000/papers/papers/CS201_2023-24_17.pdf"
        );
        assert_eq!(
            store.object_url(&store.public_base, "/a.pdf"),
            "https://cdn.example.com/papers/a.pdf"
        );
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryBlobStore::new();
        let url = store
            .store("papers/a.txt", b"hello".to_vec(), "text/plain")
            .await
            .unwrap();

        assert_eq!(store.fetch(&url).await.unwrap(), Bytes::from_static(b"hello"));
        assert!(store.fetch("memory://papers/missing").await.is_err());
    }
}

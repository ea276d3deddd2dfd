//! Object storage byte retrieval (MinIO/S3 compatible, local disk, in-memory).

use std::path::Path as FsPath;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::{
    aws::AmazonS3Builder, local::LocalFileSystem, memory::InMemory, path::Path, ObjectStore,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{FetchError, FetchResult};
use crate::fetcher::{ByteFetcher, FetchedBytes};

/// Configuration for object storage connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// S3/MinIO endpoint URL
    pub endpoint: String,
    /// Bucket name
    pub bucket: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// AWS region (use "us-east-1" for MinIO)
    pub region: String,
    /// Allow HTTP (for local MinIO)
    pub allow_http: bool,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://minio:9000".to_string(),
            bucket: "grid-data".to_string(),
            access_key_id: "minioadmin".to_string(),
            secret_access_key: "minioadmin".to_string(),
            region: "us-east-1".to_string(),
            allow_http: true,
        }
    }
}

impl ObjectStorageConfig {
    /// Create config from `S3_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: std::env::var("S3_ENDPOINT").unwrap_or(defaults.endpoint),
            bucket: std::env::var("S3_BUCKET").unwrap_or(defaults.bucket),
            access_key_id: std::env::var("S3_ACCESS_KEY").unwrap_or(defaults.access_key_id),
            secret_access_key: std::env::var("S3_SECRET_KEY")
                .unwrap_or(defaults.secret_access_key),
            region: std::env::var("S3_REGION").unwrap_or(defaults.region),
            allow_http: std::env::var("S3_ALLOW_HTTP")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.allow_http),
        }
    }
}

/// Fetches locators as object paths from any [`ObjectStore`].
#[derive(Clone)]
pub struct ObjectStoreFetcher {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreFetcher {
    /// Wrap an existing store.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Connect to an S3/MinIO bucket.
    pub fn s3(config: &ObjectStorageConfig) -> FetchResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .with_region(&config.region);

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| FetchError::Config(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self::new(Arc::new(store)))
    }

    /// Serve objects from a directory on local disk.
    pub fn local(root: impl AsRef<FsPath>) -> FetchResult<Self> {
        let store = LocalFileSystem::new_with_prefix(root.as_ref()).map_err(|e| {
            FetchError::Config(format!(
                "Failed to open {}: {}",
                root.as_ref().display(),
                e
            ))
        })?;
        Ok(Self::new(Arc::new(store)))
    }

    /// An empty in-memory store, mostly for tests and fixtures.
    pub fn in_memory() -> (Self, Arc<InMemory>) {
        let store = Arc::new(InMemory::new());
        (Self::new(store.clone()), store)
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

/// Map a locator onto an object path, dropping empty and `.` segments.
pub fn object_path(locator: &str) -> Path {
    let cleaned: Vec<&str> = locator
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    Path::from(cleaned.join("/"))
}

#[async_trait]
impl ByteFetcher for ObjectStoreFetcher {
    #[instrument(skip(self), fields(backend = "object_store"))]
    async fn fetch(&self, locator: &str) -> FetchResult<FetchedBytes> {
        let location = object_path(locator);

        let result = self.store.get(&location).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => FetchError::NotFound(locator.to_string()),
            other => FetchError::transport(locator, other),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| FetchError::transport(locator, e))?;

        debug!(size = bytes.len(), "Read object");
        Ok(FetchedBytes::raw(bytes))
    }

    fn backend(&self) -> &'static str {
        "object_store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_object_path_normalization() {
        assert_eq!(object_path("data/grid.json").as_ref(), "data/grid.json");
        assert_eq!(object_path("./data/grid.json").as_ref(), "data/grid.json");
        assert_eq!(object_path("/data//c_0_1.json.gz").as_ref(), "data/c_0_1.json.gz");
    }

    #[test]
    fn test_default_config() {
        let config = ObjectStorageConfig::default();
        assert_eq!(config.endpoint, "http://minio:9000");
        assert_eq!(config.region, "us-east-1");
        assert!(config.allow_http);
    }

    #[tokio::test]
    async fn test_in_memory_fetch() {
        let (fetcher, store) = ObjectStoreFetcher::in_memory();
        store
            .put(&Path::from("grid/meta.json"), Bytes::from_static(b"{}").into())
            .await
            .unwrap();

        let fetched = fetcher.fetch("./grid/meta.json").await.unwrap();
        assert_eq!(fetched.bytes.as_ref(), b"{}");
        assert!(fetched.content_encoding.is_none());
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let (fetcher, _store) = ObjectStoreFetcher::in_memory();
        let err = fetcher.fetch("grid/missing.json").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_local_filesystem_fetch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("tiles")).unwrap();
        std::fs::write(dir.path().join("tiles/c.json"), b"[]").unwrap();

        let fetcher = ObjectStoreFetcher::local(dir.path()).unwrap();
        let fetched = fetcher.fetch("tiles/c.json").await.unwrap();
        assert_eq!(fetched.bytes.as_ref(), b"[]");
    }
}

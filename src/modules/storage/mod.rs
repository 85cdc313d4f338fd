//! Storage module for uploaded files
//!
//! [`ObjectStorage`] is the seam the file service writes through;
//! [`MinIOClient`] implements it for MinIO or any S3-compatible service.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

/// An object written to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Full object key inside the bucket (e.g., `public/articles/<uuid>.png`)
    pub key: String,
    /// Stable URL clients use to fetch the object
    pub url: String,
}

/// Store bytes and hand back a stable reference
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under the publicly readable prefix at `path`
    async fn put(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, AppError>;

    /// Remove an object by its full key
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

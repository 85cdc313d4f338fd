use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::files::models::{NewUploadedFile, UploadedFile};

mod pg_file_repository;

pub use pg_file_repository::PgFileRepository;

/// Persistence collaborator for uploaded file metadata
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Record an uploaded file. An `article_id` that does not exist is `NotFound`.
    async fn insert(&self, file: &NewUploadedFile) -> Result<UploadedFile>;
}

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::dtos::{get_extension_from_content_type, FileResponseDto};
use crate::features::files::models::NewUploadedFile;
use crate::features::files::repositories::FileRepository;
use crate::modules::storage::ObjectStorage;

/// Service for file operations
pub struct FileService {
    repository: Arc<dyn FileRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl FileService {
    pub fn new(repository: Arc<dyn FileRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// Upload a file to storage and save metadata to database
    ///
    /// The object is stored first; if recording its metadata fails (for
    /// example because `article_id` does not exist) the object is removed
    /// again and the error returned.
    pub async fn upload_file(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
        article_id: Option<i32>,
        user_id: &str,
    ) -> Result<FileResponseDto> {
        let size = data.len() as i64;
        let path = format!(
            "articles/{}.{}",
            Uuid::now_v7(),
            file_extension(original_filename, content_type)
        );

        let stored = self.storage.put(&path, data, content_type).await?;
        debug!("File stored: {}", stored.key);

        let new_file = NewUploadedFile {
            file_name: original_filename.to_string(),
            file_key: stored.key.clone(),
            url: stored.url,
            content_type: content_type.to_string(),
            size,
            article_id,
            uploaded_by: user_id.to_string(),
        };

        let file = match self.repository.insert(&new_file).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&stored.key).await {
                    warn!(
                        "Failed to remove orphaned object '{}': {}",
                        stored.key, cleanup
                    );
                }
                return Err(e);
            }
        };

        info!(
            "File metadata saved: id={}, key={}, size={}, article_id={:?}",
            file.id, file.file_key, file.size, file.article_id
        );

        Ok(file.into())
    }
}

/// Extension from the content type, falling back to the uploaded name
fn file_extension<'a>(original_filename: &'a str, content_type: &str) -> &'a str {
    if let Some(ext) = get_extension_from_content_type(content_type) {
        return ext;
    }

    match original_filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => ext,
        _ => "bin",
    }
}

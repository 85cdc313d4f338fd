use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::files::models::UploadedFile;

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Article the file belongs to; omit to attach later via `file_urls`
    #[schema(example = 42)]
    pub article_id: Option<i32>,
}

/// Response DTO for an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: i32,
    /// Original filename as uploaded
    pub file_name: String,
    /// MIME type of the file
    pub content_type: String,
    /// Size of the file in bytes
    pub size: i64,
    /// Stable public URL of the stored file
    pub url: String,
    pub article_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<UploadedFile> for FileResponseDto {
    fn from(f: UploadedFile) -> Self {
        Self {
            id: f.id,
            file_name: f.file_name,
            content_type: f.content_type,
            size: f.size,
            url: f.url,
            article_id: f.article_id,
            created_at: f.created_at,
        }
    }
}

/// Allowed MIME types for file uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "application/pdf",
];

/// Maximum file size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Get file extension from content type
pub fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        "application/pdf" => Some("pdf"),
        _ => None,
    }
}

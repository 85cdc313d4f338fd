use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for an uploaded file
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UploadedFile {
    pub id: i32,
    pub file_name: String,
    pub file_key: String,
    pub url: String,
    pub content_type: String,
    pub size: i64,
    pub article_id: Option<i32>,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

/// Metadata for a file that has just been written to storage
#[derive(Debug, Clone)]
pub struct NewUploadedFile {
    pub file_name: String,
    pub file_key: String,
    pub url: String,
    pub content_type: String,
    pub size: i64,
    pub article_id: Option<i32>,
    pub uploaded_by: String,
}

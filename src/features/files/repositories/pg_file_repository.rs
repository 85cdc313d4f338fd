use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{handle_db_error, Result};
use crate::features::files::models::{NewUploadedFile, UploadedFile};
use crate::features::files::repositories::FileRepository;

/// PostgreSQL-backed file metadata repository
pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn insert(&self, file: &NewUploadedFile) -> Result<UploadedFile> {
        sqlx::query_as::<_, UploadedFile>(
            r#"
            INSERT INTO uploaded_files (file_name, file_key, url, content_type, size, article_id, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, file_name, file_key, url, content_type, size, article_id, uploaded_by, created_at
            "#,
        )
        .bind(&file.file_name)
        .bind(&file.file_key)
        .bind(&file.url)
        .bind(&file.content_type)
        .bind(file.size)
        .bind(file.article_id)
        .bind(&file.uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "uploaded file"))
    }
}

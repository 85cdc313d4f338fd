use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    is_mime_type_allowed, FileResponseDto, UploadFileDto, ALLOWED_MIME_TYPES, MAX_FILE_SIZE,
};
use crate::features::files::services::FileService;
use crate::shared::types::ApiResponse;

/// Fields read from the upload form
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<FilePart>,
    article_id: Option<i32>,
}

#[derive(Debug)]
struct FilePart {
    data: Vec<u8>,
    file_name: String,
    content_type: String,
}

/// Upload a file
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `article_id`: Article to attach the file to (optional)
///
/// The returned `url` can be passed in an article's `file_urls`.
#[utoipa::path(
    post,
    path = "/api/admin/files/upload",
    tag = "admin",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form with an optional owning article",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Invalid file or validation error"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Article not found"),
        (status = 413, description = "File too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>), AppError> {
    let form = read_upload_form(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    check_upload(&file)?;

    let response = service
        .upload_file(
            file.data,
            &file.file_name,
            &file.content_type,
            form.article_id,
            &user.sub,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => form.file = Some(read_file_part(field).await?),
            "article_id" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read article_id field: {}", e))
                })?;
                form.article_id = parse_article_id(&text)?;
            }
            other => debug!("Ignoring unknown field: {}", other),
        }
    }

    Ok(form)
}

async fn read_file_part(field: Field<'_>) -> Result<FilePart, AppError> {
    let content_type = field
        .content_type()
        .map(essence)
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let file_name = field.file_name().unwrap_or("unnamed").to_string();

    let data = field.bytes().await.map_err(|e| {
        debug!("Failed to read file bytes: {}", e);
        AppError::BadRequest(format!("Failed to read file data: {}", e))
    })?;

    Ok(FilePart {
        data: data.to_vec(),
        file_name,
        content_type,
    })
}

/// MIME type without parameters, lower-cased (`Image/PNG; q=1` -> `image/png`)
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn parse_article_id(text: &str) -> Result<Option<i32>, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    text.parse()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("Invalid article_id '{}'", text)))
}

fn check_upload(file: &FilePart) -> Result<(), AppError> {
    if file.data.is_empty() {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }

    if file.data.len() > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    if !is_mime_type_allowed(&file.content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            file.content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    Ok(())
}

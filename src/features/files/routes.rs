use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::features::files::dtos::MAX_FILE_SIZE;
use crate::features::files::handlers::upload_file;
use crate::features::files::services::FileService;

/// Admin file routes, nested under `/api/admin`
pub fn admin_routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route(
            "/files/upload",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            post(upload_file).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .with_state(file_service)
}

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::articles::handlers;
use crate::features::articles::services::ArticleService;

/// Public article routes (no authentication required)
pub fn public_routes(service: Arc<ArticleService>) -> Router {
    Router::new()
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/{slug}", get(handlers::get_article_by_slug))
        .with_state(service)
}

/// Admin article routes, nested under `/api/admin`
pub fn admin_routes(service: Arc<ArticleService>) -> Router {
    Router::new()
        .route(
            "/articles",
            get(handlers::admin_list_articles).post(handlers::create_article),
        )
        .route(
            "/articles/{id}",
            get(handlers::admin_get_article)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .with_state(service)
}

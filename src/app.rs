//! Router assembly shared by the binary and the HTTP tests

use std::sync::Arc;

use axum::Router;

use crate::features::articles::{routes as articles_routes, ArticleService};
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::files::{routes as files_routes, FileService};

/// Services the HTTP layer dispatches to
#[derive(Clone)]
pub struct AppServices {
    pub articles: Arc<ArticleService>,
    pub categories: Arc<CategoryService>,
    pub files: Arc<FileService>,
}

/// Routes that need no authentication
pub fn public_routes(services: &AppServices) -> Router {
    Router::new()
        .merge(articles_routes::public_routes(Arc::clone(&services.articles)))
        .merge(categories_routes::public_routes(Arc::clone(
            &services.categories,
        )))
}

/// Admin routes under `/api/admin`. Handlers require an `AuthenticatedUser`,
/// so the caller must layer authentication on top.
pub fn admin_routes(services: &AppServices) -> Router {
    let admin = Router::new()
        .merge(articles_routes::admin_routes(Arc::clone(&services.articles)))
        .merge(categories_routes::admin_routes(Arc::clone(
            &services.categories,
        )))
        .merge(files_routes::admin_routes(Arc::clone(&services.files)));

    Router::new().nest("/api/admin", admin)
}

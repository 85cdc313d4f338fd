use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::articles::dtos::{ArticleDetailDto, ArticleListQuery, ArticleSummaryDto};
use crate::features::articles::services::ArticleService;
use crate::shared::types::{ApiResponse, Meta};

/// List published articles
///
/// Newest first. Supports free-text search, category and tag filters.
#[utoipa::path(
    get,
    path = "/api/articles",
    params(ArticleListQuery),
    responses(
        (status = 200, description = "Page of published articles", body = ApiResponse<Vec<ArticleSummaryDto>>),
    ),
    tag = "articles"
)]
pub async fn list_articles(
    State(service): State<Arc<ArticleService>>,
    Query(query): Query<ArticleListQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleSummaryDto>>>> {
    let (items, total) = service.list_published(&query).await?;

    Ok(Json(ApiResponse::page(
        items,
        Meta::for_page(total, &query.pagination()),
    )))
}

/// Get a published article by slug
#[utoipa::path(
    get,
    path = "/api/articles/{slug}",
    params(
        ("slug" = String, Path, description = "Article slug")
    ),
    responses(
        (status = 200, description = "Article found", body = ApiResponse<ArticleDetailDto>),
        (status = 404, description = "Article not found or not published")
    ),
    tag = "articles"
)]
pub async fn get_article_by_slug(
    State(service): State<Arc<ArticleService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ArticleDetailDto>>> {
    let article = service.get_published_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(article), None, None)))
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::articles::dtos::{
    ArticleDetailDto, ArticleDto, ArticleListQuery, ArticleSummaryDto,
};
use crate::features::articles::services::ArticleService;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::{ApiResponse, Meta};

/// List all articles, drafts included (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/articles",
    params(ArticleListQuery),
    responses(
        (status = 200, description = "Page of articles", body = ApiResponse<Vec<ArticleSummaryDto>>),
        (status = 401, description = "Authentication required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_list_articles(
    _user: AuthenticatedUser,
    State(service): State<Arc<ArticleService>>,
    Query(query): Query<ArticleListQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleSummaryDto>>>> {
    let (items, total) = service.list_all(&query).await?;

    Ok(Json(ApiResponse::page(
        items,
        Meta::for_page(total, &query.pagination()),
    )))
}

/// Get any article by ID
#[utoipa::path(
    get,
    path = "/api/admin/articles/{id}",
    params(
        ("id" = i32, Path, description = "Article ID")
    ),
    responses(
        (status = 200, description = "Article found", body = ApiResponse<ArticleDetailDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Article not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_get_article(
    _user: AuthenticatedUser,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ArticleDetailDto>>> {
    let article = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(article), None, None)))
}

/// Create an article
///
/// The slug is derived from `slug` (or the title when absent) and made unique
/// with a numeric suffix.
#[utoipa::path(
    post,
    path = "/api/admin/articles",
    request_body = ArticleDto,
    responses(
        (status = 201, description = "Article created", body = ApiResponse<ArticleDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Referenced category or file not found"),
        (status = 409, description = "Slug claimed by a concurrent write")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_article(
    user: AuthenticatedUser,
    State(service): State<Arc<ArticleService>>,
    ValidatedJson(dto): ValidatedJson<ArticleDto>,
) -> Result<(StatusCode, Json<ApiResponse<ArticleDetailDto>>)> {
    debug!("Article create requested by {}", user.sub);
    let article = service.create(dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(article),
            Some("Article created".to_string()),
            None,
        )),
    ))
}

/// Update an article
///
/// Overwrites every field, the tag set and the attached files. The slug
/// never changes.
#[utoipa::path(
    put,
    path = "/api/admin/articles/{id}",
    params(
        ("id" = i32, Path, description = "Article ID")
    ),
    request_body = ArticleDto,
    responses(
        (status = 200, description = "Article updated", body = ApiResponse<ArticleDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Article, category or file not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_article(
    user: AuthenticatedUser,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<ArticleDto>,
) -> Result<Json<ApiResponse<ArticleDetailDto>>> {
    debug!("Article {} update requested by {}", id, user.sub);
    let article = service.update(id, dto).await?;

    Ok(Json(ApiResponse::success(
        Some(article),
        Some("Article updated".to_string()),
        None,
    )))
}

/// Delete an article
#[utoipa::path(
    delete,
    path = "/api/admin/articles/{id}",
    params(
        ("id" = i32, Path, description = "Article ID")
    ),
    responses(
        (status = 200, description = "Article deleted"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Article not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_article(
    user: AuthenticatedUser,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>> {
    debug!("Article {} delete requested by {}", id, user.sub);
    service.delete(id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Article deleted".to_string()),
        None,
    )))
}

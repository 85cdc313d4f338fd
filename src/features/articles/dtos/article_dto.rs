use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::articles::models::{ArticleFilter, ArticleRecord};
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::files::dtos::FileResponseDto;
use crate::shared::types::{default_page, default_page_size, PaginationQuery};

/// Request DTO for creating or updating an article
///
/// `slug` is only read on create; an article's slug never changes afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ArticleDto {
    #[serde(default)]
    #[validate(length(max = 255, message = "title must be at most 255 characters"))]
    #[schema(example = "Hello World!")]
    pub title: String,

    /// Preferred slug; derived from the title when absent or blank
    #[validate(length(max = 255, message = "slug must be at most 255 characters"))]
    pub slug: Option<String>,

    #[serde(default)]
    pub excerpt: String,

    /// Markdown body
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub is_published: bool,

    /// Ignored unless `is_published`; defaults to now when publishing
    pub published_on: Option<DateTime<Utc>>,

    pub category_id: Option<i32>,

    /// Free-text tag names; case variants collapse to one tag
    #[serde(default)]
    #[schema(example = json!(["rust", "axum"]))]
    pub tag_names: Vec<String>,

    /// URLs returned by the upload endpoint to attach to this article
    #[serde(default)]
    pub file_urls: Vec<String>,
}

/// Query params for listing articles
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleListQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    /// Case-insensitive text matched against title, excerpt and content
    pub search: Option<String>,

    pub category_id: Option<i32>,

    /// Tag name, matched case-insensitively
    pub tag: Option<String>,
}

impl Default for ArticleListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            search: None,
            category_id: None,
            tag: None,
        }
    }
}

impl ArticleListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }

    /// Store filter for this query; blank text filters are dropped
    pub fn to_filter(&self, published_only: bool) -> ArticleFilter {
        let pagination = self.pagination();

        ArticleFilter {
            published_only,
            search: non_blank(&self.search),
            category_id: self.category_id,
            tag: non_blank(&self.tag),
            limit: pagination.limit(),
            offset: pagination.offset(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Article as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleSummaryDto {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub is_published: bool,
    pub published_on: Option<DateTime<Utc>>,
    pub category_id: Option<i32>,
    /// Category name
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleRecord> for ArticleSummaryDto {
    fn from(r: ArticleRecord) -> Self {
        Self {
            id: r.article.id,
            title: r.article.title,
            slug: r.article.slug,
            excerpt: r.article.excerpt,
            is_published: r.article.is_published,
            published_on: r.article.published_on,
            category_id: r.article.category_id,
            category: r.category.map(|c| c.name),
            tags: r.tags.into_iter().map(|t| t.name).collect(),
            updated_at: r.article.updated_at,
        }
    }
}

/// Full article with content and everything it references
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleDetailDto {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub is_published: bool,
    pub published_on: Option<DateTime<Utc>>,
    pub category_id: Option<i32>,
    pub category: Option<CategoryResponseDto>,
    pub tags: Vec<String>,
    pub files: Vec<FileResponseDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleRecord> for ArticleDetailDto {
    fn from(r: ArticleRecord) -> Self {
        Self {
            id: r.article.id,
            title: r.article.title,
            slug: r.article.slug,
            excerpt: r.article.excerpt,
            content: r.article.content,
            is_published: r.article.is_published,
            published_on: r.article.published_on,
            category_id: r.article.category_id,
            category: r.category.map(Into::into),
            tags: r.tags.into_iter().map(|t| t.name).collect(),
            files: r.files.into_iter().map(Into::into).collect(),
            created_at: r.article.created_at,
            updated_at: r.article.updated_at,
        }
    }
}

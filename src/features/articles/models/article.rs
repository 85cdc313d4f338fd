use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::categories::models::Category;
use crate::features::files::models::UploadedFile;
use crate::features::tags::models::Tag;

/// Database model for article
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub is_published: bool,
    pub published_on: Option<DateTime<Utc>>,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable article columns written on create and overwritten on update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleFields {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub is_published: bool,
    pub published_on: Option<DateTime<Utc>>,
    pub category_id: Option<i32>,
}

impl ArticleFields {
    /// `published_on` is kept only for published articles and defaults to `now`
    pub fn publication_date(
        is_published: bool,
        requested: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        is_published.then(|| requested.unwrap_or(now))
    }
}

/// An article together with everything it references
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub article: Article,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub files: Vec<UploadedFile>,
}

/// Listing filter. `search` matches title, excerpt or content; `tag`
/// matches a tag name case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub published_only: bool,
    pub search: Option<String>,
    pub category_id: Option<i32>,
    pub tag: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
